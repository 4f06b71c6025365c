// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::forms::{FormValidator, SearchRequest};
use crate::{
    Grid, GridError, GridResult, GridViewState, NO_SELECTION, SearchOutcome, SortDirection,
};

pub const SORT_BY_COLUMN: &str = "SortByColumn";
pub const APPLY_FILTER: &str = "ApplyFilter";
pub const SEARCH_BY_COLUMN: &str = "SearchByColumn";
pub const GO_PAGE_INDEX: &str = "GoPageIndex";

/// A named notification handed to the grid by the request layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridNotice {
    pub name: String,
    pub value: String,
}

impl GridNotice {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
        }
    }
}

/// Everything a handler may read or mutate while reacting to a notice.
pub struct GridContext<'a> {
    pub grid: &'a Grid,
    pub state: &'a mut GridViewState,
    /// Search dialog input submitted with this request, if any.
    pub search_input: Option<&'a SearchRequest>,
    pub validator: &'a dyn FormValidator,
}

impl<'a> GridContext<'a> {
    pub fn new(
        grid: &'a Grid,
        state: &'a mut GridViewState,
        validator: &'a dyn FormValidator,
    ) -> Self {
        Self {
            grid,
            state,
            search_input: None,
            validator,
        }
    }

    pub fn with_search_input(mut self, input: &'a SearchRequest) -> Self {
        self.search_input = Some(input);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    SortChanged {
        column: String,
        direction: SortDirection,
    },
    FilterChanged {
        index: i64,
        changed: bool,
    },
    SearchApplied {
        column: String,
    },
    SearchRejected {
        column: String,
        errors: Vec<String>,
    },
    SearchCleared,
    PageChanged(i64),
    Custom {
        name: String,
        value: String,
    },
}

type Handler = Box<dyn Fn(&mut GridContext<'_>, &str) -> GridResult<GridEvent>>;

/// Handlers keyed by notice name, owned by one grid's request context.
#[derive(Default)]
pub struct EventTable {
    handlers: BTreeMap<String, Handler>,
}

impl fmt::Debug for EventTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTable")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EventTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the sort, filter, search and paging handlers registered.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register(SORT_BY_COLUMN, sort_by_column);
        table.register(APPLY_FILTER, apply_filter);
        table.register(SEARCH_BY_COLUMN, search_by_column);
        table.register(GO_PAGE_INDEX, go_page_index);
        table
    }

    /// Registers `handler` for `name`, replacing any earlier one.
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut GridContext<'_>, &str) -> GridResult<GridEvent> + 'static,
    {
        self.handlers.insert(name.to_owned(), Box::new(handler));
    }

    pub fn handles(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Runs the handler registered for the notice. `Ok(None)` means nobody
    /// registered interest in that name.
    pub fn dispatch(
        &self,
        context: &mut GridContext<'_>,
        notice: &GridNotice,
    ) -> GridResult<Option<GridEvent>> {
        let Some(handler) = self.handlers.get(&notice.name) else {
            debug!(event = %notice.name, "no handler registered; ignoring");
            return Ok(None);
        };
        let event = handler(context, &notice.value)?;
        debug!(event = %notice.name, value = %notice.value, outcome = ?event, "event handled");
        Ok(Some(event))
    }
}

/// Value is `column|ASC`, `column|DESC`, or a bare column name which toggles
/// the direction when that column is already the sort column.
fn sort_by_column(context: &mut GridContext<'_>, value: &str) -> GridResult<GridEvent> {
    let (column, direction) = match value.split_once('|') {
        Some((column, raw)) => {
            let direction = SortDirection::parse(raw)
                .ok_or_else(|| GridError::invalid("sort direction", raw))?;
            (column.trim(), direction)
        }
        None => {
            let column = value.trim();
            let direction = if context.state.is_sorted_by(column) {
                context.state.sort_direction.reversed()
            } else {
                SortDirection::Asc
            };
            (column, direction)
        }
    };
    context.grid.set_sort(context.state, column, direction)?;
    Ok(GridEvent::SortChanged {
        column: column.to_owned(),
        direction,
    })
}

fn apply_filter(context: &mut GridContext<'_>, value: &str) -> GridResult<GridEvent> {
    let index = value
        .trim()
        .parse::<i64>()
        .map_err(|_| GridError::invalid("filter index", value))?;
    let changed = context.grid.set_filter_index(context.state, index)?;
    Ok(GridEvent::FilterChanged { index, changed })
}

fn search_by_column(context: &mut GridContext<'_>, value: &str) -> GridResult<GridEvent> {
    let column = value.trim();
    let empty = SearchRequest::default();
    let request = if column == NO_SELECTION {
        &empty
    } else {
        context.search_input.unwrap_or(&empty)
    };
    let outcome = context
        .grid
        .apply_search(context.state, column, request, context.validator)?;
    Ok(match outcome {
        SearchOutcome::Applied(form) => GridEvent::SearchApplied {
            column: form.column,
        },
        SearchOutcome::Rejected(form) => GridEvent::SearchRejected {
            column: form.column,
            errors: form.errors,
        },
        SearchOutcome::Cleared => GridEvent::SearchCleared,
    })
}

fn go_page_index(context: &mut GridContext<'_>, value: &str) -> GridResult<GridEvent> {
    let index = value
        .trim()
        .parse::<i64>()
        .map_err(|_| GridError::invalid("page index", value))?;
    context.grid.go_page(context.state, index)?;
    Ok(GridEvent::PageChanged(index))
}
