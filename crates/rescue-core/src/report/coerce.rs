//! Total coercions from loosely typed input to report field types.
//!
//! None of these fail: unparseable input maps to `None` (or the field
//! default), never to an error.

use serde_json::Value;

use crate::models::report::UrgencyLevel;

/// Parse a count typed or extracted as text. Missing or invalid → `None`.
///
/// Negative values clamp to 0 and fractional values truncate.
pub fn parse_count(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(clamp_count(n));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| clamp_count(f.trunc() as i64))
}

/// Parse a count, defaulting to 0.
pub fn count_or_zero(text: &str) -> u32 {
    parse_count(text).unwrap_or(0)
}

fn clamp_count(n: i64) -> u32 {
    n.clamp(0, i64::from(u32::MAX)) as u32
}

/// Parse a coordinate. Empty, invalid or non-finite → `None`.
pub fn parse_coordinate(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Parse an urgency level, clamping into 1..=5.
pub fn parse_urgency(text: &str) -> Option<UrgencyLevel> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(UrgencyLevel::clamped(n));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| UrgencyLevel::clamped(f.round() as i64))
}

pub fn count_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(clamp_count)
            .or_else(|| n.as_u64().map(|_| u32::MAX))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| clamp_count(f.trunc() as i64))),
        Value::String(s) => parse_count(s),
        _ => None,
    }
}

pub fn coordinate_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_coordinate(s),
        _ => None,
    }
}

pub fn urgency_from_value(value: &Value) -> Option<UrgencyLevel> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(UrgencyLevel::clamped)
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| UrgencyLevel::clamped(f.round() as i64))),
        Value::String(s) => parse_urgency(s),
        _ => None,
    }
}
