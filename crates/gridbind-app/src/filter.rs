// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{GridError, GridResult, GridViewState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub caption: String,
    pub predicate: String,
}

/// Pre-authored predicates selected by position. Reordering the entries
/// changes what a stored index means.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    entries: Vec<FilterEntry>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_filter(&mut self, caption: &str, predicate: &str) -> i64 {
        self.entries.push(FilterEntry {
            caption: caption.to_owned(),
            predicate: predicate.to_owned(),
        });
        (self.entries.len() - 1) as i64
    }

    /// `Ok(None)` for negative indexes, which mean "no filter".
    pub fn resolve(&self, index: i64) -> GridResult<Option<&str>> {
        if index < 0 {
            return Ok(None);
        }
        usize::try_from(index)
            .ok()
            .and_then(|position| self.entries.get(position))
            .map(|entry| Some(entry.predicate.as_str()))
            .ok_or(GridError::UnknownFilter(index))
    }

    /// Selects `index` in `state`, rejecting positions that were never
    /// registered. Returns whether the selection changed.
    pub fn set_filter_index(&self, state: &mut GridViewState, index: i64) -> GridResult<bool> {
        self.resolve(index)?;
        Ok(state.set_filter_index(index))
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::FilterRegistry;
    use crate::{GridError, GridViewState, UNKNOWN};
    use anyhow::Result;

    fn registry() -> FilterRegistry {
        let mut filters = FilterRegistry::new();
        filters.add_filter("In stock", "quantity > 0");
        filters.add_filter("Premium", "price_cents >= 10000");
        filters
    }

    #[test]
    fn resolves_by_position() -> Result<()> {
        let filters = registry();
        assert_eq!(filters.resolve(-1)?, None);
        assert_eq!(filters.resolve(0)?, Some("quantity > 0"));
        assert_eq!(filters.resolve(1)?, Some("price_cents >= 10000"));
        Ok(())
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let error = registry().resolve(2).expect_err("index 2 is unregistered");
        assert!(matches!(error, GridError::UnknownFilter(2)));
    }

    #[test]
    fn selecting_new_index_resets_counts() -> Result<()> {
        let filters = registry();
        let mut state = GridViewState {
            total_record_count: 10,
            page_count: 1,
            ..GridViewState::default()
        };
        assert!(filters.set_filter_index(&mut state, 1)?);
        assert_eq!(state.filter_index, 1);
        assert_eq!(state.total_record_count, UNKNOWN);

        state.total_record_count = 4;
        assert!(!filters.set_filter_index(&mut state, 1)?);
        assert_eq!(state.total_record_count, 4);

        assert!(filters.set_filter_index(&mut state, 7).is_err());
        assert_eq!(state.filter_index, 1);
        Ok(())
    }
}
