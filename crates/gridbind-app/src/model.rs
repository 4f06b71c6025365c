// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::search::SearchSpec;

/// Reserved sort/search column name meaning "nothing selected".
pub const NO_SELECTION: &str = "~";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOperator {
    #[default]
    None,
    Contains,
    Equals,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    Between,
}

impl SearchOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Contains => "CONTAINS",
            Self::Equals => "EQUALS",
            Self::StartsWith => "STARTSWITH",
            Self::EndsWith => "ENDSWITH",
            Self::GreaterThan => "GREATER_THAN",
            Self::LessThan => "LESS_THAN",
            Self::Between => "BETWEEN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" => Some(Self::None),
            "CONTAINS" => Some(Self::Contains),
            "EQUALS" => Some(Self::Equals),
            "STARTSWITH" => Some(Self::StartsWith),
            "ENDSWITH" => Some(Self::EndsWith),
            "GREATER_THAN" => Some(Self::GreaterThan),
            "LESS_THAN" => Some(Self::LessThan),
            "BETWEEN" => Some(Self::Between),
            _ => None,
        }
    }

    pub const fn needs_alt_argument(self) -> bool {
        matches!(self, Self::Between)
    }
}

/// Operator vocabulary a search dialog offers, fixed when the column is
/// configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorFamily {
    Literal,
    Logical,
}

impl OperatorFamily {
    pub const fn operators(self) -> [SearchOperator; 4] {
        match self {
            Self::Literal => [
                SearchOperator::Contains,
                SearchOperator::Equals,
                SearchOperator::StartsWith,
                SearchOperator::EndsWith,
            ],
            Self::Logical => [
                SearchOperator::Equals,
                SearchOperator::GreaterThan,
                SearchOperator::LessThan,
                SearchOperator::Between,
            ],
        }
    }

    pub fn offers(self, operator: SearchOperator) -> bool {
        operator == SearchOperator::None || self.operators().contains(&operator)
    }

    /// Only logical dialogs render the second argument control.
    pub const fn has_alt_argument(self) -> bool {
        matches!(self, Self::Logical)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Logical => "logical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "literal" => Some(Self::Literal),
            "logical" => Some(Self::Logical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Text,
    Number,
    Money,
    Date,
    /// Row actions (edit, delete, ...). Carries no data.
    Command,
}

impl ColumnKind {
    pub const fn is_bound(self) -> bool {
        !matches!(self, Self::Command)
    }

    pub const fn default_family(self) -> OperatorFamily {
        match self {
            Self::Text | Self::Command => OperatorFamily::Literal,
            Self::Number | Self::Money | Self::Date => OperatorFamily::Logical,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Money => "money",
            Self::Date => "date",
            Self::Command => "command",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "money" => Some(Self::Money),
            "date" => Some(Self::Date),
            "command" => Some(Self::Command),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    pub caption: String,
    pub kind: ColumnKind,
    /// Row member the cell value is read from.
    pub binding: String,
    pub sort_expression: String,
    pub sortable: bool,
    pub search_expression: String,
    pub search: Option<SearchSpec>,
    pub exportable: bool,
    pub visible: bool,
}

impl ColumnMetadata {
    pub fn new(kind: ColumnKind, name: &str, caption: &str) -> Self {
        let bound = kind.is_bound();
        Self {
            name: name.to_owned(),
            caption: caption.to_owned(),
            kind,
            binding: if bound { name.to_owned() } else { String::new() },
            sort_expression: if bound { name.to_owned() } else { String::new() },
            sortable: bound,
            search_expression: String::new(),
            search: None,
            exportable: bound,
            visible: true,
        }
    }

    pub fn text(name: &str, caption: &str) -> Self {
        Self::new(ColumnKind::Text, name, caption)
    }

    pub fn number(name: &str, caption: &str) -> Self {
        Self::new(ColumnKind::Number, name, caption)
    }

    pub fn money(name: &str, caption: &str) -> Self {
        Self::new(ColumnKind::Money, name, caption)
    }

    pub fn date(name: &str, caption: &str) -> Self {
        Self::new(ColumnKind::Date, name, caption)
    }

    pub fn command(name: &str, caption: &str) -> Self {
        Self::new(ColumnKind::Command, name, caption)
    }

    /// Rebinds the column to another row member. The sort expression follows
    /// unless it was set explicitly.
    pub fn bind_to(mut self, member: &str) -> Self {
        if self.sort_expression == self.binding {
            self.sort_expression = member.to_owned();
        }
        self.binding = member.to_owned();
        self
    }

    pub fn sort_by(mut self, expression: &str) -> Self {
        self.sort_expression = expression.to_owned();
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Attaches a search dialog using the kind's default operator family.
    pub fn searchable(self, expression: &str) -> Self {
        let family = self.kind.default_family();
        self.searchable_with(expression, family)
    }

    pub fn searchable_with(mut self, expression: &str, family: OperatorFamily) -> Self {
        self.search_expression = expression.to_owned();
        self.search = Some(SearchSpec::new(family));
        self
    }

    pub fn not_exportable(mut self) -> Self {
        self.exportable = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn is_bound(&self) -> bool {
        self.kind.is_bound()
    }

    pub fn is_sortable(&self) -> bool {
        self.is_bound() && self.sortable && !self.sort_expression.is_empty()
    }

    pub fn is_searchable(&self) -> bool {
        self.is_bound() && self.search.is_some()
    }

    pub fn is_exportable(&self) -> bool {
        self.is_bound() && self.exportable
    }
}
