//! Pure predicates over bare values.
//!
//! Nothing in here knows about chains, schemas or execution contexts. Each
//! function inspects a [`Value`] and answers a yes/no question. Predicates
//! whose *parameter* can be unusable (a limit that is not a number, a list
//! that is empty) return `Result` and report a [`SchemaError`].

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Number, Value};

use crate::error::SchemaError;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Null, or the empty string. Missing values are looked up as null.
pub fn is_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Null-like, an empty array or an empty object.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        other => is_null(other),
    }
}

pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

pub fn is_number(value: &Value) -> bool {
    value.is_number()
}

/// A number without a fractional part (`3` and `3.0` both qualify).
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => true,
        Value::Number(n) => n
            .as_f64()
            .is_some_and(|f| f.is_finite() && f.fract() == 0.0),
        _ => false,
    }
}

/// A JSON object. Arrays and null are not objects.
pub fn is_object(value: &Value) -> bool {
    value.is_object()
}

pub fn is_array(value: &Value) -> bool {
    value.is_array()
}

pub fn is_email(value: &Value) -> bool {
    value.as_str().is_some_and(|s| email_regex().is_match(s))
}

/// Strict equality. Numbers compare by numeric value, everything else
/// structurally.
pub fn is_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b) == Some(Ordering::Equal),
        _ => left == right,
    }
}

/// Orders two numbers. Two integers compare exactly over the full 64-bit
/// range; a float on either side compares as `f64`.
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    match (a.is_f64() || b.is_f64(), a.as_i64(), b.as_i64()) {
        // a negative i64 against a u64 above i64::MAX
        (false, Some(_), None) => Some(Ordering::Less),
        (false, None, Some(_)) => Some(Ordering::Greater),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// Strings matching `regex`. Non-strings never match.
pub fn is_match(value: &Value, regex: &Regex) -> bool {
    value.as_str().is_some_and(|s| regex.is_match(s))
}

/// `value >= limit`, where a string value is measured by its length.
///
/// # Errors
///
/// [`SchemaError::ExpectedNumber`] when `limit` is not a number.
pub fn is_at_least(value: &Value, limit: &Value) -> Result<bool, SchemaError> {
    let limit = number_param(limit)?;
    Ok(measure(value).is_some_and(|v| compare_numbers(&v, limit).is_some_and(Ordering::is_ge)))
}

/// `value <= limit`, where a string value is measured by its length.
///
/// # Errors
///
/// [`SchemaError::ExpectedNumber`] when `limit` is not a number.
pub fn is_at_most(value: &Value, limit: &Value) -> Result<bool, SchemaError> {
    let limit = number_param(limit)?;
    Ok(measure(value).is_some_and(|v| compare_numbers(&v, limit).is_some_and(Ordering::is_le)))
}

/// Membership in `list` using [`is_equal`].
///
/// # Errors
///
/// [`SchemaError::ExpectedList`] when `list` is not an array and
/// [`SchemaError::EmptyOneOf`] when it is empty.
pub fn is_one_of(value: &Value, list: &Value) -> Result<bool, SchemaError> {
    let items = list
        .as_array()
        .ok_or_else(|| SchemaError::ExpectedList(describe(list)))?;
    if is_empty(list) {
        return Err(SchemaError::EmptyOneOf);
    }
    Ok(items.iter().any(|item| is_equal(value, item)))
}

fn number_param(limit: &Value) -> Result<&Number, SchemaError> {
    match limit {
        Value::Number(n) => Ok(n),
        other => Err(SchemaError::ExpectedNumber(describe(other))),
    }
}

/// Character count for strings, the value itself for numbers.
fn measure(value: &Value) -> Option<Number> {
    match value {
        Value::String(s) => Some(Number::from(s.chars().count())),
        Value::Number(n) => Some(n.clone()),
        _ => None,
    }
}

/// Returns the JSON type name for a value.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Type name and JSON text of a value, for error messages.
pub(crate) fn describe(value: &Value) -> String {
    format!("{} {}", value_type_name(value), value)
}
