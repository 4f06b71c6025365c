// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::{ColumnMetadata, GridError, GridResult};

/// Bound columns in declaration order, addressable by name.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    columns: Vec<ColumnMetadata>,
    by_name: BTreeMap<String, usize>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: ColumnMetadata) -> GridResult<()> {
        if self.by_name.contains_key(&column.name) {
            return Err(GridError::DuplicateColumn(column.name));
        }
        self.by_name.insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ColumnMetadata> {
        self.by_name.get(name).map(|index| &self.columns[*index])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ColumnMetadata> {
        self.by_name
            .get(name)
            .copied()
            .map(move |index| &mut self.columns[index])
    }

    pub fn require(&self, name: &str) -> GridResult<&ColumnMetadata> {
        self.get(name)
            .ok_or_else(|| GridError::UnknownColumn(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter()
    }

    pub fn first_sortable(&self) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|column| column.is_sortable())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
