// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

pub type GridResult<T> = Result<T, GridError>;

/// Failures raised while configuring, mutating or binding a grid.
///
/// Configuration variants abort the request. Search input problems never show
/// up here; they deactivate the search and land on the form's error list.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("paging needs a sortable column -- mark a bound column sortable or set a default sort")]
    NoSortableColumn,

    #[error("unknown column {0:?}")]
    UnknownColumn(String),

    #[error("unknown filter index {0}")]
    UnknownFilter(i64),

    #[error("column {0:?} is declared more than once")]
    DuplicateColumn(String),

    #[error("column {0:?} is not sortable")]
    ColumnNotSortable(String),

    #[error("column {0:?} is not searchable")]
    ColumnNotSearchable(String),

    #[error("invalid value {value:?} for {name}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("page size must be positive, got {0}")]
    InvalidPageSize(i64),

    #[error("cannot decode grid state: {0}")]
    StateDecode(String),

    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

impl GridError {
    pub fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
        }
    }

    /// True for errors that point at a mis-configured grid rather than at
    /// request data or the data source.
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NoSortableColumn
                | Self::UnknownColumn(_)
                | Self::UnknownFilter(_)
                | Self::DuplicateColumn(_)
                | Self::ColumnNotSortable(_)
                | Self::ColumnNotSearchable(_)
                | Self::InvalidPageSize(_)
        )
    }
}
