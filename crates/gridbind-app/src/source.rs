// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One result row; fields are addressed by member name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, member: &str, value: impl Into<CellValue>) -> Self {
        self.set(member, value);
        self
    }

    pub fn set(&mut self, member: &str, value: impl Into<CellValue>) {
        self.fields.insert(member.to_owned(), value.into());
    }

    pub fn get(&self, member: &str) -> Option<&CellValue> {
        self.fields.get(member)
    }

    /// Display text for `member`; empty for missing members and nulls.
    pub fn text(&self, member: &str) -> String {
        self.get(member).map(ToString::to_string).unwrap_or_default()
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Query adapter the composer drives.
///
/// Calls accumulate: predicates are AND-ed, ordering terms are applied in
/// call order, and `take`/`skip` describe one LIMIT/OFFSET window regardless
/// of which is called first. `count` and `materialize` execute the query and
/// consume the adapter, so the composer counts on a cheap clone taken before
/// any ordering or window is applied.
pub trait DataSource: Clone {
    fn and_where(&mut self, predicate: &str);
    fn order_by(&mut self, expression: &str);
    fn order_by_descending(&mut self, expression: &str);
    fn take(&mut self, count: i64);
    fn skip(&mut self, count: i64);
    fn count(self) -> Result<i64>;
    fn materialize(self) -> Result<Vec<Row>>;
}
