//! Trace parsing and format detection.
//!
//! This module handles:
//! - Detecting which dialect a trace document uses
//! - Normalizing each dialect into an `OrchestrationGraph`
//! - Reading traces from strings and files
//!
//! Normalization is lenient: malformed entries are skipped with a warning.
//! Only a document that is not a JSON object at all is an error.

pub mod conversation;
pub mod crew;
pub mod detect;
pub mod fields;
pub mod otel;
pub mod runs;
pub mod timestamp;

// Re-export main types
pub use conversation::ConversationNormalizer;
pub use crew::CrewNormalizer;
pub use detect::{detect_format, TraceFormat};
pub use otel::OpenTelemetryNormalizer;
pub use runs::RunChainNormalizer;
pub use timestamp::parse_timestamp;

use crate::graph::OrchestrationGraph;
use crate::utils::error::ParseError;
use log::{debug, info};
use serde_json::{Map, Value};
use std::path::Path;

/// Metadata key recording which dialect produced a graph
pub const SOURCE_FORMAT_KEY: &str = "source_format";

/// Converts one trace dialect into the canonical graph
pub trait Normalizer {
    /// Build a graph from an already-detected document
    ///
    /// Never fails; unusable entries are dropped.
    fn normalize(&self, document: &Map<String, Value>) -> OrchestrationGraph;
}

impl TraceFormat {
    /// Normalizer responsible for this dialect
    pub fn normalizer(&self) -> &'static dyn Normalizer {
        match self {
            TraceFormat::OpenTelemetry => &OpenTelemetryNormalizer,
            TraceFormat::RunChain => &RunChainNormalizer,
            TraceFormat::Crew => &CrewNormalizer,
            TraceFormat::Conversation => &ConversationNormalizer,
        }
    }
}

/// Parse a trace document of any supported dialect
///
/// **Public** - main entry point for parsing
///
/// # Arguments
/// * `raw_trace` - Parsed JSON document
///
/// # Returns
/// The normalized graph, tagged with its `source_format` in metadata
///
/// # Errors
/// * `ParseError::InvalidFormat` - The document is not a JSON object
pub fn parse_trace(raw_trace: &Value) -> Result<OrchestrationGraph, ParseError> {
    let document = raw_trace.as_object().ok_or_else(|| {
        ParseError::InvalidFormat(format!(
            "Trace must be a JSON object, got {}",
            json_kind(raw_trace)
        ))
    })?;

    let format = detect_format(document);
    debug!("Detected trace format: {}", format);

    let mut graph = format.normalizer().normalize(document);
    graph.metadata.insert(
        SOURCE_FORMAT_KEY.to_string(),
        Value::String(format.as_str().to_string()),
    );

    debug!(
        "Normalized '{}': {} nodes, {} edges",
        graph.name,
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Parse a trace from JSON text
///
/// # Errors
/// * `ParseError::JsonError` - The text is not valid JSON
/// * `ParseError::InvalidFormat` - The JSON is not an object
pub fn parse_trace_str(text: &str) -> Result<OrchestrationGraph, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    parse_trace(&value)
}

/// Read and parse a trace file
///
/// # Errors
/// * `ParseError::Io` - The file cannot be read
/// * `ParseError::JsonError` / `ParseError::InvalidFormat` - as for `parse_trace_str`
pub fn parse_trace_file(path: impl AsRef<Path>) -> Result<OrchestrationGraph, ParseError> {
    let path = path.as_ref();
    info!("Reading trace from: {}", path.display());

    let text = std::fs::read_to_string(path)?;
    parse_trace_str(&text)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_rejected() {
        let err = parse_trace(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_source_format_recorded() {
        let graph = parse_trace(&json!({"crew_name": "Team"})).unwrap();
        assert_eq!(graph.metadata[SOURCE_FORMAT_KEY], json!("crew"));
    }

    #[test]
    fn test_bad_json_text() {
        let err = parse_trace_str("{not json").unwrap_err();
        assert!(matches!(err, ParseError::JsonError(_)));
    }
}
