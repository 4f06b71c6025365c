// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{GridError, GridResult, SortDirection};

/// Column that forces a fixed ordering term ahead of the user sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingColumn {
    pub name: String,
    pub caption: String,
    pub expression: String,
    pub direction: SortDirection,
    pub visible: bool,
}

impl GroupingColumn {
    pub fn new(name: &str, caption: &str, direction: SortDirection) -> Self {
        Self {
            name: name.to_owned(),
            caption: caption.to_owned(),
            expression: name.to_owned(),
            direction,
            visible: true,
        }
    }

    pub fn order_by(mut self, expression: &str) -> Self {
        self.expression = expression.to_owned();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub expression: String,
    pub direction: SortDirection,
}

impl OrderTerm {
    pub fn new(expression: &str, direction: SortDirection) -> Self {
        Self {
            expression: expression.to_owned(),
            direction,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupingPlan {
    columns: Vec<GroupingColumn>,
}

impl GroupingPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: GroupingColumn) -> GridResult<()> {
        if self.contains(&column.name) {
            return Err(GridError::DuplicateColumn(column.name));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut GroupingColumn> {
        self.columns.iter_mut().find(|column| column.name == name)
    }

    pub fn columns(&self) -> &[GroupingColumn] {
        &self.columns
    }

    /// Ordering terms of the visible grouping columns, in declaration order.
    pub fn order_terms(&self) -> Vec<OrderTerm> {
        self.columns
            .iter()
            .filter(|column| column.visible)
            .map(|column| OrderTerm::new(&column.expression, column.direction))
            .collect()
    }
}
