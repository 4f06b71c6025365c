// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, warn};

use crate::forms::{FormValidator, SearchForm, SearchRequest, parse_number};
use crate::{ColumnMetadata, GridViewState, OperatorFamily, SearchOperator};

/// Search dialog attached to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSpec {
    pub family: OperatorFamily,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Applied(SearchForm),
    Rejected(SearchForm),
    Cleared,
}

impl SearchSpec {
    pub const fn new(family: OperatorFamily) -> Self {
        Self { family }
    }

    /// Commits a search dialog submission into `state`.
    ///
    /// An invalid form deactivates the search instead of failing. Either way
    /// the cached counts are stale afterwards.
    pub fn apply(
        &self,
        column: &ColumnMetadata,
        state: &mut GridViewState,
        request: &SearchRequest,
        validator: &dyn FormValidator,
    ) -> SearchOutcome {
        let Some(mut form) = SearchForm::bind(column, request) else {
            state.clear_search();
            return SearchOutcome::Cleared;
        };

        if !validator.validate(&mut form) {
            warn!(
                column = %column.name,
                errors = ?form.errors,
                "search input rejected; search deactivated"
            );
            state.clear_search();
            return SearchOutcome::Rejected(form);
        }

        let argument_alt = if form.has_alt_argument() {
            form.argument_alt.as_str()
        } else {
            ""
        };
        state.set_search(&column.name, form.operator, &form.argument, argument_alt);
        debug!(
            column = %column.name,
            operator = form.operator.as_str(),
            "search committed"
        );
        SearchOutcome::Applied(form)
    }
}

pub fn translate(
    family: OperatorFamily,
    expression: &str,
    operator: SearchOperator,
    argument: &str,
    argument_alt: &str,
) -> Option<String> {
    let arg = escape_literal(argument);
    let predicate = match operator {
        SearchOperator::None => return None,
        SearchOperator::Contains => format!("{expression} LIKE '%{arg}%'"),
        SearchOperator::EndsWith => format!("{expression} LIKE '%{arg}'"),
        SearchOperator::StartsWith => format!("{expression} LIKE '{arg}%'"),
        SearchOperator::Equals => match family {
            OperatorFamily::Literal => format!("{expression} LIKE '{arg}'"),
            OperatorFamily::Logical => format!("{expression} = '{arg}'"),
        },
        SearchOperator::Between => format!(
            "{expression} BETWEEN {} AND {}",
            between_bound(argument),
            between_bound(argument_alt)
        ),
        SearchOperator::GreaterThan => format!("{expression} > '{arg}'"),
        SearchOperator::LessThan => format!("{expression} < '{arg}'"),
    };
    Some(predicate)
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

// Numbers go in bare; anything else becomes a quoted literal.
fn between_bound(value: &str) -> String {
    let trimmed = value.trim();
    if parse_number(trimmed).is_some() {
        trimmed.to_owned()
    } else {
        format!("'{}'", escape_literal(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::{SearchOutcome, SearchSpec, translate};
    use crate::forms::{SearchRequest, TypedValidator};
    use crate::{
        ColumnMetadata, GridViewState, NO_SELECTION, OperatorFamily, SearchOperator, UNKNOWN,
    };

    #[test]
    fn literal_family_uses_like_patterns() {
        let literal = |operator| translate(OperatorFamily::Literal, "col", operator, "5", "9");
        assert_eq!(
            literal(SearchOperator::Contains).as_deref(),
            Some("col LIKE '%5%'")
        );
        assert_eq!(
            literal(SearchOperator::EndsWith).as_deref(),
            Some("col LIKE '%5'")
        );
        assert_eq!(
            literal(SearchOperator::Equals).as_deref(),
            Some("col LIKE '5'")
        );
        assert_eq!(
            literal(SearchOperator::StartsWith).as_deref(),
            Some("col LIKE '5%'")
        );
        assert_eq!(literal(SearchOperator::None), None);
    }

    #[test]
    fn logical_family_uses_comparisons() {
        let logical = |operator| translate(OperatorFamily::Logical, "col", operator, "5", "9");
        assert_eq!(
            logical(SearchOperator::Between).as_deref(),
            Some("col BETWEEN 5 AND 9")
        );
        assert_eq!(
            logical(SearchOperator::GreaterThan).as_deref(),
            Some("col > '5'")
        );
        assert_eq!(
            logical(SearchOperator::LessThan).as_deref(),
            Some("col < '5'")
        );
        assert_eq!(
            logical(SearchOperator::Equals).as_deref(),
            Some("col = '5'")
        );
        assert_eq!(logical(SearchOperator::None), None);
    }

    #[test]
    fn quotes_in_arguments_are_doubled() {
        let predicate = translate(
            OperatorFamily::Literal,
            "name",
            SearchOperator::Contains,
            "o'brien",
            "",
        );
        assert_eq!(predicate.as_deref(), Some("name LIKE '%o''brien%'"));
    }

    #[test]
    fn non_numeric_between_bounds_are_quoted() {
        let predicate = translate(
            OperatorFamily::Logical,
            "stocked_on",
            SearchOperator::Between,
            "2026-01-01",
            "2026-01-31",
        );
        assert_eq!(
            predicate.as_deref(),
            Some("stocked_on BETWEEN '2026-01-01' AND '2026-01-31'")
        );
    }

    #[test]
    fn valid_submission_writes_state() {
        let column = ColumnMetadata::number("quantity", "Qty").searchable("quantity");
        let spec = column.search.expect("searchable");
        let mut state = GridViewState {
            total_record_count: 40,
            page_count: 4,
            ..GridViewState::default()
        };
        let request = SearchRequest::new(SearchOperator::Between, "5").with_alt("9");

        let outcome = spec.apply(&column, &mut state, &request, &TypedValidator);
        assert!(matches!(outcome, SearchOutcome::Applied(_)));
        assert_eq!(state.search_column_name, "quantity");
        assert_eq!(state.search_operator, SearchOperator::Between);
        assert_eq!(state.search_argument, "5");
        assert_eq!(state.search_argument_alt, "9");
        assert_eq!(state.total_record_count, UNKNOWN);
        assert_eq!(state.page_count, UNKNOWN);
    }

    #[test]
    fn alt_argument_dropped_without_alt_control() {
        let column = ColumnMetadata::text("name", "Name").searchable("name");
        let spec = column.search.expect("searchable");
        let mut state = GridViewState::default();
        let request = SearchRequest::new(SearchOperator::Contains, "bolt").with_alt("ignored");

        spec.apply(&column, &mut state, &request, &TypedValidator);
        assert_eq!(state.search_argument, "bolt");
        assert_eq!(state.search_argument_alt, "");
    }

    #[test]
    fn invalid_submission_deactivates_search() {
        let column = ColumnMetadata::number("quantity", "Qty").searchable("quantity");
        let spec = column.search.expect("searchable");
        let mut state = GridViewState::default();
        state.set_search("quantity", SearchOperator::GreaterThan, "3", "");
        state.total_record_count = 12;

        let request = SearchRequest::new(SearchOperator::GreaterThan, "lots");
        let outcome = spec.apply(&column, &mut state, &request, &TypedValidator);
        let SearchOutcome::Rejected(form) = outcome else {
            panic!("expected rejection, got {outcome:?}");
        };
        assert!(!form.errors.is_empty());
        assert_eq!(state.search_column_name, NO_SELECTION);
        assert_eq!(state.search_operator, SearchOperator::None);
        assert_eq!(state.search_argument, "");
        assert_eq!(state.search_argument_alt, "");
        assert_eq!(state.total_record_count, UNKNOWN);
    }
}
