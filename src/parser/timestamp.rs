//! Timestamp parsing for the trace dialects.
//!
//! Every normalizer funnels timestamps through here. A value that cannot
//! be understood becomes `None`; it never fails the surrounding trace.

use crate::utils::config::{MILLISECOND_EPOCH_THRESHOLD, NANOS_PER_SECOND};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Parse a timestamp to epoch seconds
///
/// **Public** - used by every dialect
///
/// Accepts:
/// * numbers as epoch seconds
/// * numbers above 1e10 as epoch milliseconds
/// * ISO-8601 strings (offset, `Z`, or naive which is read as UTC)
///
/// Anything else yields `None`.
pub fn parse_timestamp(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => {
            let ts = n.as_f64()?;
            if ts > MILLISECOND_EPOCH_THRESHOLD {
                Some(ts / 1000.0)
            } else {
                Some(ts)
            }
        }
        Value::String(s) => parse_iso8601(s.trim()),
        _ => None,
    }
}

/// Parse an OTLP `*TimeUnixNano` value to epoch seconds
///
/// OTLP JSON encodes these as decimal strings, but some exporters emit
/// plain numbers.
pub fn parse_unix_nanos(value: &Value) -> Option<f64> {
    let nanos = match value {
        Value::Number(n) => n.as_u64().map(|v| v as f64).or_else(|| n.as_f64())?,
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .map(|v| v as f64)
                .or_else(|_| s.parse::<f64>())
                .ok()?
        }
        _ => return None,
    };
    Some(nanos / NANOS_PER_SECOND)
}

/// Parse an ISO-8601 string to epoch seconds
///
/// **Private** - internal helper for parse_timestamp
fn parse_iso8601(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }

    // Date and time separated by a space instead of 'T'
    let normalized = if s.len() > 10 && s.as_bytes()[10] == b' ' {
        format!("{}T{}", &s[..10], &s[11..])
    } else {
        s.to_string()
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(epoch_seconds(dt.timestamp(), dt.timestamp_subsec_nanos()));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            let dt = Utc.from_utc_datetime(&naive);
            return Some(epoch_seconds(dt.timestamp(), dt.timestamp_subsec_nanos()));
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).timestamp() as f64)
}

fn epoch_seconds(secs: i64, subsec_nanos: u32) -> f64 {
    secs as f64 + f64::from(subsec_nanos) / NANOS_PER_SECOND
}
