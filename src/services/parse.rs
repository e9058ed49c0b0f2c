//! Parse-or-default readers for loosely typed storage fields.
//!
//! Stored values may arrive as JSON numbers, numeric strings, empty strings
//! or be missing entirely. Each reader accepts the well-formed cases and
//! falls back to an explicit default otherwise; none of them yields NaN.

use chrono::{DateTime, Utc};
use serde_json::Value;

fn as_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Integer field, fractional parts truncated
pub fn int_or(value: Option<&Value>, default: i64) -> i64 {
    as_number(value)
        .filter(|n| *n >= i64::MIN as f64 && *n <= i64::MAX as f64)
        .map(|n| n.trunc() as i64)
        .unwrap_or(default)
}

/// Integer field that must be at least 1 (capacities, stay lengths)
pub fn positive_int_or(value: Option<&Value>, default: u32) -> u32 {
    as_number(value)
        .map(f64::trunc)
        .filter(|n| *n >= 1.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32)
        .unwrap_or(default)
}

/// Non-negative counter field
pub fn count_or(value: Option<&Value>, default: u32) -> u32 {
    as_number(value)
        .map(f64::trunc)
        .filter(|n| *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32)
        .unwrap_or(default)
}

pub fn float_or(value: Option<&Value>, default: f64) -> f64 {
    as_number(value).unwrap_or(default)
}

/// Amounts such as fees, where negatives are rejected
pub fn non_negative_float_or(value: Option<&Value>, default: f64) -> f64 {
    as_number(value).filter(|n| *n >= 0.0).unwrap_or(default)
}

pub fn bounded_float_or(value: Option<&Value>, min: f64, max: f64, default: f64) -> f64 {
    as_number(value)
        .filter(|n| (min..=max).contains(n))
        .unwrap_or(default)
}

/// Text field; empty strings count as missing
pub fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

pub fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

pub fn timestamp_or_now(value: Option<&Value>) -> DateTime<Utc> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}
