// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use gridbind_app::{
    BoundPage, EventTable, ExportTable, Grid, GridContext, GridEvent, GridNotice, GridViewState,
    SearchRequest, TypedValidator,
};
use gridbind_db::Store;
use tracing::warn;

/// One round trip: the state carried in, the notices raised, the search
/// dialog input submitted alongside them.
#[derive(Debug, Clone, Default)]
pub struct GridRequest {
    pub state: Option<String>,
    pub notices: Vec<GridNotice>,
    pub search: Option<SearchRequest>,
    pub export: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridOutput {
    Page(BoundPage),
    Export(ExportTable),
}

#[derive(Debug, Clone)]
pub struct GridResponse {
    pub events: Vec<GridEvent>,
    pub output: GridOutput,
    pub state: GridViewState,
    pub state_blob: String,
}

pub struct GridRuntime<'a> {
    store: &'a Store,
    grid: Grid,
    table: String,
    events: EventTable,
}

impl<'a> GridRuntime<'a> {
    pub fn new(store: &'a Store, grid: Grid, table: &str) -> Self {
        Self {
            store,
            grid,
            table: table.to_owned(),
            events: EventTable::standard(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Verifies the table exists and reports column bindings it lacks.
    pub fn check(&self) -> Result<Vec<String>> {
        if !self.store.table_exists(&self.table)? {
            bail!(
                "table {:?} does not exist -- check [grid].table or pass --demo",
                self.table
            );
        }
        let available = self.store.table_columns(&self.table)?;
        let missing = self
            .grid
            .columns()
            .iter()
            .filter(|column| column.is_bound())
            .filter(|column| !available.contains(&column.binding))
            .map(|column| column.binding.clone())
            .collect::<Vec<_>>();
        for binding in &missing {
            warn!(table = %self.table, %binding, "column binding not found in table");
        }
        Ok(missing)
    }

    pub fn handle(&self, request: &GridRequest) -> Result<GridResponse> {
        let mut state = GridViewState::restore(request.state.as_deref());

        let mut events = Vec::with_capacity(request.notices.len());
        for notice in &request.notices {
            let mut context = GridContext::new(&self.grid, &mut state, &TypedValidator);
            if let Some(search) = &request.search {
                context = context.with_search_input(search);
            }
            let event = self
                .events
                .dispatch(&mut context, notice)
                .with_context(|| format!("handle {}={}", notice.name, notice.value))?;
            match event {
                Some(event) => events.push(event),
                None => warn!(event = %notice.name, "ignoring unregistered event"),
            }
        }

        let source = self.store.source(&self.table)?;
        let output = if request.export {
            GridOutput::Export(self.grid.export_view(&state, source)?)
        } else {
            GridOutput::Page(self.grid.data_bind(&mut state, source)?)
        };
        let state_blob = state.encode()?;
        Ok(GridResponse {
            events,
            output,
            state,
            state_blob,
        })
    }
}

/// Tab-separated page: captions, one line per row, then a pager line.
pub fn render_page(grid: &Grid, page: &BoundPage, state: &GridViewState) -> String {
    let columns = grid
        .columns()
        .iter()
        .filter(|column| column.is_bound() && column.visible)
        .collect::<Vec<_>>();

    let mut out = String::new();
    let headers = columns
        .iter()
        .map(|column| column.caption.as_str())
        .collect::<Vec<_>>();
    out.push_str(&headers.join("\t"));
    out.push('\n');
    for row in &page.rows {
        let cells = columns
            .iter()
            .map(|column| row.text(&column.binding))
            .collect::<Vec<_>>();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    if let Some(form) = &page.search_form {
        out.push_str(&format!(
            "# search: {} {} {}\n",
            form.column,
            form.operator.as_str(),
            form.argument
        ));
    }
    if grid.paging().enabled && state.is_count_known() {
        out.push_str(&format!(
            "# page {} of {} ({} rows)\n",
            state.page_index + 1,
            state.page_count.max(1),
            state.total_record_count
        ));
    }
    out
}

pub fn render_export(table: &ExportTable) -> String {
    let mut out = table.headers.join("\t");
    out.push('\n');
    for row in &table.rows {
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}
