//! Field access helpers shared by the trace normalizers.
//!
//! Trace dialects disagree on key names (`spanId` vs `span_id`, `id` vs
//! `run_id`) and on value types. These helpers try each candidate key in
//! order and quietly ignore values of the wrong shape.

use crate::graph::Metadata;
use serde_json::{Map, Value};

/// First non-empty string found under any of `keys`
pub fn str_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
}

/// First usable identifier found under any of `keys`
///
/// Numeric ids are accepted and rendered as strings.
pub fn id_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|key| obj.get(*key)).find_map(|value| match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Array under the first present key of `keys`, or an empty slice
pub fn array_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Copy the present, non-null values of `keys` into a metadata map
pub fn copy_fields(obj: &Map<String, Value>, keys: &[&str]) -> Metadata {
    keys.iter()
        .filter_map(|key| match obj.get(*key) {
            None | Some(Value::Null) => None,
            Some(value) => Some((key.to_string(), value.clone())),
        })
        .collect()
}

/// Look up `key` in an explicit mapping table
pub fn lookup<T: Copy>(table: &[(&str, T)], key: &str) -> Option<T> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, value)| *value)
}

/// Shorten `text` to at most `max_chars` characters, marking the cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max_chars).collect();
    shortened.push_str("...");
    shortened
}
