// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use time::Date;
use time::macros::format_description;

use crate::{ColumnKind, ColumnMetadata, OperatorFamily, SearchOperator};

/// Raw search-dialog input as it arrives with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub argument: String,
    /// `None` when the dialog has no second argument control.
    pub argument_alt: Option<String>,
    pub operator: String,
}

impl SearchRequest {
    pub fn new(operator: SearchOperator, argument: &str) -> Self {
        Self {
            argument: argument.to_owned(),
            argument_alt: None,
            operator: operator.as_str().to_owned(),
        }
    }

    pub fn with_alt(mut self, argument_alt: &str) -> Self {
        self.argument_alt = Some(argument_alt.to_owned());
        self
    }
}

/// Search dialog model for one column, bound from a request or re-hydrated
/// from grid state for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    pub column: String,
    pub kind: ColumnKind,
    pub family: OperatorFamily,
    pub argument: String,
    pub argument_alt: String,
    pub operator: SearchOperator,
    pub errors: Vec<String>,
}

impl SearchForm {
    /// `None` for columns without a search dialog.
    pub fn blank_for(column: &ColumnMetadata) -> Option<Self> {
        let spec = column.search.as_ref().filter(|_| column.is_searchable())?;
        Some(Self {
            column: column.name.clone(),
            kind: column.kind,
            family: spec.family,
            argument: String::new(),
            argument_alt: String::new(),
            operator: SearchOperator::None,
            errors: Vec::new(),
        })
    }

    pub fn bind(column: &ColumnMetadata, request: &SearchRequest) -> Option<Self> {
        let mut form = Self::blank_for(column)?;
        form.argument = request.argument.trim().to_owned();
        form.argument_alt = request
            .argument_alt
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_owned();
        form.operator = SearchOperator::parse(&request.operator).unwrap_or(SearchOperator::None);
        Some(form)
    }

    pub fn has_alt_argument(&self) -> bool {
        self.family.has_alt_argument()
    }

    pub fn validate(&self) -> Result<()> {
        if self.operator == SearchOperator::None {
            bail!("search operator is required -- choose an operator and retry");
        }
        if !self.family.offers(self.operator) {
            bail!(
                "operator {} is not offered for {} search on {}",
                self.operator.as_str(),
                self.family.as_str(),
                self.column
            );
        }
        if self.argument.is_empty() {
            bail!("search value is required -- enter a value and retry");
        }
        if self.operator.needs_alt_argument() && self.argument_alt.is_empty() {
            bail!("BETWEEN needs a second value -- enter the upper bound and retry");
        }

        if self.family == OperatorFamily::Logical {
            let mut values = vec![self.argument.as_str()];
            if self.operator.needs_alt_argument() {
                values.push(self.argument_alt.as_str());
            }
            for value in values {
                match self.kind {
                    ColumnKind::Number | ColumnKind::Money => {
                        if parse_number(value).is_none() {
                            bail!("{value:?} is not a number");
                        }
                    }
                    ColumnKind::Date => {
                        if parse_date(value).is_none() {
                            bail!("{value:?} is not a date -- use YYYY-MM-DD");
                        }
                    }
                    ColumnKind::Text | ColumnKind::Command => {}
                }
            }
        }
        Ok(())
    }
}

/// Validation collaborator consulted before a search is committed.
///
/// Returning `false` deactivates the search; messages go on `form.errors`.
pub trait FormValidator {
    fn validate(&self, form: &mut SearchForm) -> bool;
}

/// Checks required values, operator vocabulary and argument types.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedValidator;

impl FormValidator for TypedValidator {
    fn validate(&self, form: &mut SearchForm) -> bool {
        match form.validate() {
            Ok(()) => true,
            Err(error) => {
                form.errors.push(error.to_string());
                false
            }
        }
    }
}

pub(crate) fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|number| number.is_finite())
}

fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), &format_description!("[year]-[month]-[day]")).ok()
}
