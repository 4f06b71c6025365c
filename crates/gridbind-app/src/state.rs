// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::{GridError, GridResult, NO_SELECTION, SearchOperator, SortDirection};

/// Sentinel for counts that have to be recomputed on the next bind.
pub const UNKNOWN: i64 = -1;

/// Paging, sort, filter and search selection of one grid.
///
/// The value travels between requests as an opaque blob (see
/// [`crate::transport`]). Filter and search mutations mark the cached counts
/// stale; the page index is left alone and clamped by the next bind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridViewState {
    pub page_index: i64,
    pub page_count: i64,
    pub total_record_count: i64,
    pub sort_column_name: String,
    pub sort_direction: SortDirection,
    pub filter_index: i64,
    pub search_column_name: String,
    pub search_operator: SearchOperator,
    pub search_argument: String,
    pub search_argument_alt: String,
}

impl Default for GridViewState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_count: UNKNOWN,
            total_record_count: UNKNOWN,
            sort_column_name: NO_SELECTION.to_owned(),
            sort_direction: SortDirection::Asc,
            filter_index: UNKNOWN,
            search_column_name: NO_SELECTION.to_owned(),
            search_operator: SearchOperator::None,
            search_argument: String::new(),
            search_argument_alt: String::new(),
        }
    }
}

impl GridViewState {
    pub fn has_explicit_sort(&self) -> bool {
        self.sort_column_name != NO_SELECTION
    }

    pub fn is_sorted_by(&self, column: &str) -> bool {
        self.has_explicit_sort() && self.sort_column_name == column
    }

    pub fn is_search_active(&self) -> bool {
        self.search_column_name != NO_SELECTION
    }

    pub fn is_filter_active(&self) -> bool {
        self.filter_index >= 0
    }

    pub fn is_count_known(&self) -> bool {
        self.total_record_count != UNKNOWN
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next_page(&self) -> bool {
        self.page_count != UNKNOWN && self.page_index + 1 < self.page_count
    }

    pub fn invalidate_counts(&mut self) {
        self.page_count = UNKNOWN;
        self.total_record_count = UNKNOWN;
    }

    pub fn set_sort(&mut self, column: &str, direction: SortDirection) {
        self.sort_column_name = column.to_owned();
        self.sort_direction = direction;
    }

    /// Returns whether the selection changed. Counts only go stale on change.
    pub fn set_filter_index(&mut self, index: i64) -> bool {
        let index = index.max(UNKNOWN);
        if index == self.filter_index {
            return false;
        }
        self.filter_index = index;
        self.invalidate_counts();
        true
    }

    pub fn set_search(
        &mut self,
        column: &str,
        operator: SearchOperator,
        argument: &str,
        argument_alt: &str,
    ) {
        self.search_column_name = column.to_owned();
        self.search_operator = operator;
        self.search_argument = argument.to_owned();
        self.search_argument_alt = argument_alt.to_owned();
        self.invalidate_counts();
    }

    pub fn clear_search(&mut self) {
        self.set_search(NO_SELECTION, SearchOperator::None, "", "");
    }

    pub fn set_page_index(&mut self, index: i64) {
        self.page_index = index.max(0);
    }

    /// Records a fresh row count and pulls the page index back into range.
    pub(crate) fn record_count(&mut self, total: i64, page_size: i64) {
        self.total_record_count = total;
        self.page_count = page_count_for(total, page_size);
        self.clamp_page_index();
    }

    /// Rejects index and count combinations no sequence of grid events can
    /// produce. Blobs come back from clients, so they are checked on decode.
    pub fn check(&self) -> GridResult<()> {
        if self.page_index < 0 {
            return Err(GridError::StateDecode(format!(
                "negative page index {}",
                self.page_index
            )));
        }
        if self.total_record_count < UNKNOWN || self.page_count < UNKNOWN {
            return Err(GridError::StateDecode(format!(
                "negative counts {}/{}",
                self.total_record_count, self.page_count
            )));
        }
        if (self.total_record_count == UNKNOWN) != (self.page_count == UNKNOWN) {
            return Err(GridError::StateDecode(
                "page count and row count disagree on being known".to_owned(),
            ));
        }
        if self.filter_index < UNKNOWN {
            return Err(GridError::StateDecode(format!(
                "filter index {} out of range",
                self.filter_index
            )));
        }
        Ok(())
    }

    pub(crate) fn clamp_page_index(&mut self) {
        self.page_index = self.page_index.max(0);
        if self.page_count == UNKNOWN {
            return;
        }
        if self.page_index > 0 && self.page_index >= self.page_count {
            self.page_index = (self.page_count - 1).max(0);
        }
    }
}

pub fn page_count_for(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total <= 0 {
        return 0;
    }
    total / page_size + i64::from(total % page_size != 0)
}
