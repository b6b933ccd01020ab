//! Semantic type inference for a column of raw values
//!
//! The rules are tried in a fixed order and the first one that matches the
//! whole value set wins:
//!
//! 1. every value blank → `Unknown`
//! 2. every value a boolean literal → `Boolean`
//! 3. every value a number → `Numeric`
//! 4. every value a recognized date/time → `DateLike`
//! 5. few distinct values → `Categorical`
//! 6. anything else → `Text`
//!
//! Numbers are checked before dates, so `20230101` is numeric.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashSet;

use super::context::AnalysisContext;
use super::model::SemanticType;

const BOOLEAN_LITERALS: [&str; 4] = ["true", "false", "yes", "no"];

const DATE_FORMATS: [&str; 11] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y-%b-%d",
];

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

#[derive(Debug, Clone, PartialEq)]
pub struct TypeInference {
    pub semantic_type: SemanticType,
    /// Distinct values in first-seen order, capped at the example limit
    pub examples: Vec<String>,
    pub distinct_count: usize,
}

/// Infer the semantic type of a column's non-null values
pub fn infer_type(values: &[String], ctx: &AnalysisContext<'_>) -> TypeInference {
    let config = ctx.config();

    let mut seen = HashSet::new();
    let mut examples = Vec::new();
    for value in values {
        if seen.insert(value.as_str()) && examples.len() < config.max_examples {
            examples.push(value.clone());
        }
    }
    let distinct_count = seen.len();

    let semantic_type = if values.iter().all(|v| v.trim().is_empty()) {
        examples.clear();
        SemanticType::Unknown
    } else if values.iter().all(|v| is_boolean_literal(v)) {
        SemanticType::Boolean
    } else if values.iter().all(|v| ctx.is_number(v)) {
        SemanticType::Numeric
    } else if values.iter().all(|v| is_date_like(v)) {
        SemanticType::DateLike
    } else if is_categorical(distinct_count, values.len(), ctx) {
        SemanticType::Categorical
    } else {
        SemanticType::Text
    };

    TypeInference {
        semantic_type,
        examples,
        distinct_count,
    }
}

/// Distinct count within `max(categorical_min_distinct, ratio × count)`
pub fn is_categorical(distinct_count: usize, value_count: usize, ctx: &AnalysisContext<'_>) -> bool {
    let config = ctx.config();
    let ratio_limit = config.categorical_ratio * value_count as f64;
    let limit = ratio_limit.max(config.categorical_min_distinct as f64);
    distinct_count as f64 <= limit
}

pub fn is_boolean_literal(value: &str) -> bool {
    let value = value.trim();
    BOOLEAN_LITERALS
        .iter()
        .any(|literal| value.eq_ignore_ascii_case(literal))
}

pub fn is_date_like(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }

    if DateTime::parse_from_rfc3339(value).is_ok() || DateTime::parse_from_rfc2822(value).is_ok() {
        return true;
    }
    if DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
    {
        return true;
    }
    if DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
    {
        return true;
    }
    if TIME_FORMATS
        .iter()
        .any(|fmt| NaiveTime::parse_from_str(value, fmt).is_ok())
    {
        return true;
    }

    // Year-month periods such as 2023-07
    value.len() == 7
        && NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").is_ok()
}
