// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::{ColumnRegistry, GridError, GridResult, GridViewState, SortDirection};

/// Resolved "which column, which direction".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub expression: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Resolves the sort for a bind.
    ///
    /// An explicit state sort wins. Otherwise the configured default, or with
    /// paging the first sortable column, is chosen ascending and written back
    /// into `state` so later requests see the same order. Without paging and
    /// without any choice there is nothing to sort by.
    pub fn resolve(
        columns: &ColumnRegistry,
        default_sort: Option<&(String, SortDirection)>,
        paging: bool,
        state: &mut GridViewState,
    ) -> GridResult<Option<Self>> {
        if state.has_explicit_sort() {
            let column = columns.require(&state.sort_column_name)?;
            if !column.is_sortable() {
                return Err(GridError::ColumnNotSortable(column.name.clone()));
            }
            return Ok(Some(Self {
                column: column.name.clone(),
                expression: column.sort_expression.clone(),
                direction: state.sort_direction,
            }));
        }

        let (column, direction) = match default_sort {
            Some((name, direction)) => (columns.require(name)?, *direction),
            None if paging => (
                columns.first_sortable().ok_or(GridError::NoSortableColumn)?,
                SortDirection::Asc,
            ),
            None => return Ok(None),
        };

        debug!(column = %column.name, direction = direction.as_str(), "default sort chosen");
        state.set_sort(&column.name, direction);
        Ok(Some(Self {
            column: column.name.clone(),
            expression: column.sort_expression.clone(),
            direction,
        }))
    }
}
