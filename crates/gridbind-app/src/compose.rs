// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, info, warn};

use crate::forms::SearchForm;
use crate::{
    DataSource, Grid, GridResult, GridViewState, OrderTerm, Row, SortDirection, SortSpec,
};

/// What a bind hands to rendering besides the advanced state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundPage {
    pub rows: Vec<Row>,
    /// Search dialog of the active search column, filled from state.
    pub search_form: Option<SearchForm>,
    /// Ordering that was applied, grouping terms first.
    pub order: Vec<OrderTerm>,
}

/// Flattened result for export writers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Turns grid configuration plus view state into adapter calls.
///
/// Binding advances the state: counts are filled in, the page index may be
/// clamped and a default sort may be persisted.
#[derive(Debug, Clone, Copy)]
pub struct QueryComposer<'g> {
    grid: &'g Grid,
}

impl<'g> QueryComposer<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self { grid }
    }

    pub fn bind<S: DataSource>(
        &self,
        state: &mut GridViewState,
        source: S,
    ) -> GridResult<BoundPage> {
        let paging = self.grid.paging();
        // Resolve before touching the source so a grid without a usable
        // order fails without running any query.
        let sort = SortSpec::resolve(
            self.grid.columns(),
            self.grid.default_sort(),
            paging.enabled,
            state,
        )?;

        let mut query = source;
        let search_form = self.apply_predicates(state, &mut query)?;

        if paging.enabled {
            if state.is_count_known() {
                debug!(
                    grid = self.grid.name(),
                    total = state.total_record_count,
                    "reusing cached row count"
                );
                // The page count is derived from the cached total, never trusted.
                state.record_count(state.total_record_count, paging.page_size);
            } else {
                let total = query.clone().count()?;
                state.record_count(total, paging.page_size);
                debug!(
                    grid = self.grid.name(),
                    total,
                    pages = state.page_count,
                    "row count refreshed"
                );
            }
            query.take(paging.page_size);
            query.skip(state.page_index.saturating_mul(paging.page_size));
        }

        let order = self.apply_order(sort.as_ref(), &mut query);
        let rows = query.materialize()?;
        info!(
            grid = self.grid.name(),
            rows = rows.len(),
            page = state.page_index,
            pages = state.page_count,
            total = state.total_record_count,
            "grid bound"
        );
        Ok(BoundPage {
            rows,
            search_form,
            order,
        })
    }

    /// Binds a plain record sequence. Only counting and the page window
    /// apply; filters, search and ordering are the caller's business.
    pub fn bind_records(
        &self,
        state: &mut GridViewState,
        records: &[Row],
    ) -> GridResult<BoundPage> {
        let paging = self.grid.paging();
        if !paging.enabled {
            return Ok(BoundPage {
                rows: records.to_vec(),
                ..BoundPage::default()
            });
        }

        let total = if state.is_count_known() {
            state.total_record_count
        } else {
            records.len() as i64
        };
        state.record_count(total, paging.page_size);
        let start = usize::try_from(state.page_index.saturating_mul(paging.page_size))
            .unwrap_or(usize::MAX);
        let size = usize::try_from(paging.page_size).unwrap_or(usize::MAX);
        let rows = records.iter().skip(start).take(size).cloned().collect();
        Ok(BoundPage {
            rows,
            ..BoundPage::default()
        })
    }

    /// Every row matching the current filter and search, in grid order,
    /// projected onto the exportable columns. `state` is left untouched.
    pub fn export<S: DataSource>(
        &self,
        state: &GridViewState,
        source: S,
    ) -> GridResult<ExportTable> {
        let mut scratch = state.clone();
        let sort = SortSpec::resolve(
            self.grid.columns(),
            self.grid.default_sort(),
            self.grid.paging().enabled,
            &mut scratch,
        )?;

        let mut query = source;
        self.apply_predicates(&mut scratch, &mut query)?;
        self.apply_order(sort.as_ref(), &mut query);
        let records = query.materialize()?;

        let columns = self
            .grid
            .columns()
            .iter()
            .filter(|column| column.is_exportable())
            .collect::<Vec<_>>();
        Ok(ExportTable {
            headers: columns.iter().map(|column| column.caption.clone()).collect(),
            rows: records
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|column| row.text(&column.binding))
                        .collect()
                })
                .collect(),
        })
    }

    fn apply_predicates<S: DataSource>(
        &self,
        state: &mut GridViewState,
        query: &mut S,
    ) -> GridResult<Option<SearchForm>> {
        if let Some(predicate) = self.grid.filters().resolve(state.filter_index)? {
            debug!(grid = self.grid.name(), predicate, "filter applied");
            query.and_where(predicate);
        }

        if !state.is_search_active() {
            return Ok(None);
        }

        let column = self.grid.column(&state.search_column_name)?;
        let Some(mut form) = SearchForm::blank_for(column) else {
            return Ok(None);
        };
        form.argument = state.search_argument.clone();
        form.argument_alt = state.search_argument_alt.clone();
        form.operator = state.search_operator;

        // A restored search has to pass the same checks as a submitted one.
        if let Err(error) = form.validate() {
            warn!(
                column = %column.name,
                %error,
                "restored search is invalid; search deactivated"
            );
            state.clear_search();
            return Ok(None);
        }

        if column.search_expression.is_empty() {
            debug!(column = %column.name, "search dialog without expression; no predicate");
            return Ok(Some(form));
        }
        if let Some(predicate) = crate::search::translate(
            form.family,
            &column.search_expression,
            state.search_operator,
            &state.search_argument,
            &state.search_argument_alt,
        ) {
            debug!(grid = self.grid.name(), %predicate, "search applied");
            query.and_where(&predicate);
        }
        Ok(Some(form))
    }

    fn apply_order<S: DataSource>(
        &self,
        sort: Option<&SortSpec>,
        query: &mut S,
    ) -> Vec<OrderTerm> {
        let mut order = self.grid.grouping().order_terms();
        if let Some(sort) = sort {
            order.push(OrderTerm::new(&sort.expression, sort.direction));
        }
        for term in &order {
            match term.direction {
                SortDirection::Asc => query.order_by(&term.expression),
                SortDirection::Desc => query.order_by_descending(&term.expression),
            }
        }
        order
    }
}

impl Grid {
    pub fn data_bind<S: DataSource>(
        &self,
        state: &mut GridViewState,
        source: S,
    ) -> GridResult<BoundPage> {
        QueryComposer::new(self).bind(state, source)
    }

    pub fn bind_records(
        &self,
        state: &mut GridViewState,
        records: &[Row],
    ) -> GridResult<BoundPage> {
        QueryComposer::new(self).bind_records(state, records)
    }

    pub fn export_view<S: DataSource>(
        &self,
        state: &GridViewState,
        source: S,
    ) -> GridResult<ExportTable> {
        QueryComposer::new(self).export(state, source)
    }
}
