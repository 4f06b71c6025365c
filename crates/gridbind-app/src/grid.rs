// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::forms::{FormValidator, SearchRequest};
use crate::{
    ColumnMetadata, ColumnRegistry, FilterRegistry, GridError, GridResult, GridViewState,
    GroupingColumn, GroupingPlan, NO_SELECTION, SearchOutcome, SortDirection,
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub enabled: bool,
    pub page_size: i64,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Static configuration of one listing: columns, grouping, filters, paging.
///
/// Built once per request and shared read-only by the event handlers and the
/// composer. Per-request selections live in [`GridViewState`].
#[derive(Debug, Clone)]
pub struct Grid {
    name: String,
    columns: ColumnRegistry,
    grouping: GroupingPlan,
    filters: FilterRegistry,
    paging: Paging,
    default_sort: Option<(String, SortDirection)>,
}

impl Grid {
    pub fn builder(name: &str) -> GridBuilder {
        GridBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    pub fn grouping(&self) -> &GroupingPlan {
        &self.grouping
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    pub fn default_sort(&self) -> Option<&(String, SortDirection)> {
        self.default_sort.as_ref()
    }

    pub fn column(&self, name: &str) -> GridResult<&ColumnMetadata> {
        self.columns.require(name)
    }

    pub fn set_column_visible(&mut self, name: &str, visible: bool) -> GridResult<()> {
        if let Some(column) = self.columns.get_mut(name) {
            column.visible = visible;
            return Ok(());
        }
        if let Some(column) = self.grouping.get_mut(name) {
            column.visible = visible;
            return Ok(());
        }
        Err(GridError::UnknownColumn(name.to_owned()))
    }

    pub fn set_sort(
        &self,
        state: &mut GridViewState,
        column: &str,
        direction: SortDirection,
    ) -> GridResult<()> {
        let column = self.columns.require(column)?;
        if !column.is_sortable() {
            return Err(GridError::ColumnNotSortable(column.name.clone()));
        }
        state.set_sort(&column.name, direction);
        Ok(())
    }

    pub fn set_filter_index(&self, state: &mut GridViewState, index: i64) -> GridResult<bool> {
        self.filters.set_filter_index(state, index)
    }

    /// Commits a search dialog submission for `column`, or clears the search
    /// when `column` is the no-selection sentinel.
    pub fn apply_search(
        &self,
        state: &mut GridViewState,
        column: &str,
        request: &SearchRequest,
        validator: &dyn FormValidator,
    ) -> GridResult<SearchOutcome> {
        if column == NO_SELECTION {
            state.clear_search();
            return Ok(SearchOutcome::Cleared);
        }
        let column = self.columns.require(column)?;
        let spec = column
            .search
            .filter(|_| column.is_searchable())
            .ok_or_else(|| GridError::ColumnNotSearchable(column.name.clone()))?;
        Ok(spec.apply(column, state, request, validator))
    }

    pub fn go_page(&self, state: &mut GridViewState, index: i64) -> GridResult<()> {
        if index < 0 {
            return Err(GridError::invalid("page index", index.to_string()));
        }
        state.set_page_index(index);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GridBuilder {
    name: String,
    columns: Vec<ColumnMetadata>,
    grouping: Vec<GroupingColumn>,
    filters: Vec<(String, String)>,
    paging: Paging,
    default_sort: Option<(String, SortDirection)>,
}

impl GridBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            columns: Vec::new(),
            grouping: Vec::new(),
            filters: Vec::new(),
            paging: Paging::default(),
            default_sort: None,
        }
    }

    pub fn column(mut self, column: ColumnMetadata) -> Self {
        self.columns.push(column);
        self
    }

    pub fn grouping(mut self, column: GroupingColumn) -> Self {
        self.grouping.push(column);
        self
    }

    pub fn filter(mut self, caption: &str, predicate: &str) -> Self {
        self.filters.push((caption.to_owned(), predicate.to_owned()));
        self
    }

    pub fn page_size(mut self, page_size: i64) -> Self {
        self.paging.page_size = page_size;
        self
    }

    pub fn paging(mut self, enabled: bool) -> Self {
        self.paging.enabled = enabled;
        self
    }

    pub fn default_sort(mut self, column: &str, direction: SortDirection) -> Self {
        self.default_sort = Some((column.to_owned(), direction));
        self
    }

    pub fn build(self) -> GridResult<Grid> {
        if self.paging.page_size <= 0 {
            return Err(GridError::InvalidPageSize(self.paging.page_size));
        }

        let mut columns = ColumnRegistry::new();
        for column in self.columns {
            columns.insert(column)?;
        }

        let mut grouping = GroupingPlan::new();
        for column in self.grouping {
            if columns.contains(&column.name) {
                return Err(GridError::DuplicateColumn(column.name));
            }
            grouping.push(column)?;
        }

        let mut filters = FilterRegistry::new();
        for (caption, predicate) in &self.filters {
            filters.add_filter(caption, predicate);
        }

        if let Some((name, _)) = &self.default_sort {
            let column = columns.require(name)?;
            if !column.is_sortable() {
                return Err(GridError::ColumnNotSortable(name.clone()));
            }
        }

        Ok(Grid {
            name: self.name,
            columns,
            grouping,
            filters,
            paging: self.paging,
            default_sort: self.default_sort,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_PAGE_SIZE, Grid};
    use crate::forms::{SearchRequest, TypedValidator};
    use crate::{
        ColumnMetadata, GridError, GridViewState, GroupingColumn, NO_SELECTION, SearchOperator,
        SearchOutcome, SortDirection,
    };
    use anyhow::Result;

    fn products() -> Result<Grid> {
        Ok(Grid::builder("products")
            .column(ColumnMetadata::text("name", "Name").searchable("name"))
            .column(ColumnMetadata::number("quantity", "Qty").unsortable())
            .column(ColumnMetadata::command("edit", ""))
            .grouping(GroupingColumn::new("category", "Category", SortDirection::Asc))
            .filter("In stock", "quantity > 0")
            .build()?)
    }

    #[test]
    fn builder_defaults() -> Result<()> {
        let grid = products()?;
        assert_eq!(grid.name(), "products");
        assert!(grid.paging().enabled);
        assert_eq!(grid.paging().page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(grid.columns().len(), 3);
        assert_eq!(grid.filters().len(), 1);
        assert!(grid.default_sort().is_none());
        Ok(())
    }

    #[test]
    fn build_rejects_bad_configuration() {
        let zero_page = Grid::builder("g")
            .column(ColumnMetadata::text("a", "A"))
            .page_size(0)
            .build();
        assert!(matches!(zero_page, Err(GridError::InvalidPageSize(0))));

        let unknown_default = Grid::builder("g")
            .column(ColumnMetadata::text("a", "A"))
            .default_sort("b", SortDirection::Asc)
            .build();
        assert!(matches!(unknown_default, Err(GridError::UnknownColumn(name)) if name == "b"));

        let unsortable_default = Grid::builder("g")
            .column(ColumnMetadata::text("a", "A").unsortable())
            .default_sort("a", SortDirection::Asc)
            .build();
        assert!(matches!(unsortable_default, Err(GridError::ColumnNotSortable(_))));

        let clash = Grid::builder("g")
            .column(ColumnMetadata::text("a", "A"))
            .grouping(GroupingColumn::new("a", "A", SortDirection::Asc))
            .build();
        assert!(matches!(clash, Err(GridError::DuplicateColumn(_))));
    }

    #[test]
    fn set_sort_requires_sortable_column() -> Result<()> {
        let grid = products()?;
        let mut state = GridViewState::default();
        grid.set_sort(&mut state, "name", SortDirection::Desc)?;
        assert!(state.is_sorted_by("name"));

        assert!(matches!(
            grid.set_sort(&mut state, "quantity", SortDirection::Asc),
            Err(GridError::ColumnNotSortable(_))
        ));
        assert!(matches!(
            grid.set_sort(&mut state, "category", SortDirection::Asc),
            Err(GridError::UnknownColumn(_))
        ));
        assert!(state.is_sorted_by("name"));
        Ok(())
    }

    #[test]
    fn visibility_toggles_bound_and_grouping_columns() -> Result<()> {
        let mut grid = products()?;
        grid.set_column_visible("category", false)?;
        assert!(grid.grouping().order_terms().is_empty());
        grid.set_column_visible("name", false)?;
        assert!(!grid.column("name")?.visible);
        assert!(grid.set_column_visible("ghost", true).is_err());
        Ok(())
    }

    #[test]
    fn sentinel_search_column_clears_regardless_of_prior_state() -> Result<()> {
        let grid = products()?;
        let mut state = GridViewState::default();
        state.set_search("name", SearchOperator::Contains, "bolt", "x");

        let outcome = grid.apply_search(
            &mut state,
            NO_SELECTION,
            &SearchRequest::new(SearchOperator::Contains, "nut"),
            &TypedValidator,
        )?;
        assert_eq!(outcome, SearchOutcome::Cleared);
        assert_eq!(state.search_column_name, NO_SELECTION);
        assert_eq!(state.search_operator, SearchOperator::None);
        assert_eq!(state.search_argument, "");
        assert_eq!(state.search_argument_alt, "");
        Ok(())
    }

    #[test]
    fn search_on_column_without_dialog_is_rejected() -> Result<()> {
        let grid = products()?;
        let mut state = GridViewState::default();
        let error = grid
            .apply_search(
                &mut state,
                "quantity",
                &SearchRequest::new(SearchOperator::Equals, "3"),
                &TypedValidator,
            )
            .expect_err("quantity has no search dialog");
        assert!(matches!(error, GridError::ColumnNotSearchable(_)));
        Ok(())
    }

    #[test]
    fn go_page_rejects_negative_index() -> Result<()> {
        let grid = products()?;
        let mut state = GridViewState::default();
        grid.go_page(&mut state, 4)?;
        assert_eq!(state.page_index, 4);
        assert!(matches!(
            grid.go_page(&mut state, -2),
            Err(GridError::InvalidParameter { .. })
        ));
        assert_eq!(state.page_index, 4);
        Ok(())
    }
}
