//! OpenTelemetry trace normalizer.
//!
//! Handles OTLP JSON exports, either the simplified `{"spans": [...]}`
//! shape or the full `resourceSpans -> scopeSpans -> spans` nesting.
//! Parent/child structure comes from `parentSpanId`.

use super::fields::{id_field, lookup, str_field};
use super::timestamp::{parse_timestamp, parse_unix_nanos};
use super::Normalizer;
use crate::graph::{Edge, Metadata, Node, NodeType, OrchestrationGraph};
use crate::utils::config::DEFAULT_OTEL_NAME;
use log::{debug, warn};
use serde_json::{Map, Value};

/// Span name / attribute key hints, checked in order
const NODE_TYPE_HINTS: &[(&str, NodeType)] = &[
    ("langchain.agent", NodeType::Agent),
    ("langchain.tool", NodeType::Tool),
    ("langchain.llm", NodeType::LlmCall),
    ("crewai.agent", NodeType::Agent),
    ("crewai.task", NodeType::Agent),
    ("crewai.tool", NodeType::Tool),
    ("autogen.agent", NodeType::Agent),
    ("autogen.function", NodeType::Tool),
    ("openai.chat", NodeType::LlmCall),
    ("anthropic.messages", NodeType::LlmCall),
];

/// Values of the `openinference.span.kind` attribute
const OPENINFERENCE_KINDS: &[(&str, NodeType)] = &[
    ("AGENT", NodeType::Agent),
    ("CHAIN", NodeType::Agent),
    ("TOOL", NodeType::Tool),
    ("LLM", NodeType::LlmCall),
];

const OPENINFERENCE_KIND_KEY: &str = "openinference.span.kind";

/// Normalizer for OTLP span exports
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenTelemetryNormalizer;

/// Parent link recorded while nodes are created
struct PendingLink {
    span_id: String,
    parent_id: String,
    label: String,
}

impl Normalizer for OpenTelemetryNormalizer {
    fn normalize(&self, document: &Map<String, Value>) -> OrchestrationGraph {
        let name = str_field(document, &["name"]).unwrap_or(DEFAULT_OTEL_NAME);
        let mut graph = OrchestrationGraph::new(name);

        let spans = extract_spans(document);
        debug!("Found {} spans", spans.len());

        let mut links = Vec::new();
        for (index, span) in spans.iter().enumerate() {
            let Some(span) = span.as_object() else {
                warn!("Skipping span {}: not a JSON object", index);
                continue;
            };

            let node = span_to_node(span, &graph);
            if let Some(parent_id) = id_field(span, &["parentSpanId", "parent_span_id"]) {
                links.push(PendingLink {
                    span_id: node.id.clone(),
                    parent_id,
                    label: node.name.clone(),
                });
            }
            graph.add_node(node);
        }

        // Parents may appear after their children, so link once all spans exist
        for link in links {
            if graph.contains_node(&link.parent_id) {
                graph.add_edge(Edge::new(link.parent_id, link.span_id).with_label(link.label));
            } else {
                debug!(
                    "Span {} references unknown parent {}; treating as root",
                    link.span_id, link.parent_id
                );
            }
        }

        graph
    }
}

/// Extract a flat list of spans from either OTLP shape
///
/// **Private** - internal helper for normalize
fn extract_spans(document: &Map<String, Value>) -> Vec<&Value> {
    if let Some(spans) = document.get("spans") {
        return match spans.as_array() {
            Some(spans) => spans.iter().collect(),
            None => {
                warn!("'spans' is not an array; no spans extracted");
                Vec::new()
            }
        };
    }

    let mut spans = Vec::new();
    let resource_spans = document
        .get("resourceSpans")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    for resource_span in resource_spans.iter().filter_map(Value::as_object) {
        for scope_key in ["scopeSpans", "instrumentationLibrarySpans"] {
            let scopes = resource_span
                .get(scope_key)
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            for scope in scopes.iter().filter_map(Value::as_object) {
                if let Some(scope_spans) = scope.get("spans").and_then(Value::as_array) {
                    spans.extend(scope_spans.iter());
                }
            }
        }
    }

    spans
}

/// Convert one span into a node
///
/// **Private** - missing fields degrade instead of failing
fn span_to_node(span: &Map<String, Value>, graph: &OrchestrationGraph) -> Node {
    let id = id_field(span, &["spanId", "span_id"]).unwrap_or_else(|| {
        let id = graph.synthetic_id("span");
        debug!("Span without id, assigned {}", id);
        id
    });
    let name = str_field(span, &["name"]).unwrap_or("Unknown");

    let attributes = parse_attributes(span.get("attributes"));
    let node_type = detect_node_type(name, &attributes);

    let start_time = span_time(span, "startTimeUnixNano", "start_time");
    let end_time = span_time(span, "endTimeUnixNano", "end_time");

    Node::new(id, name, node_type)
        .with_times(start_time, end_time)
        .with_metadata(attributes)
}

/// Read a span timestamp, preferring the OTLP nanosecond field
fn span_time(span: &Map<String, Value>, nanos_key: &str, fallback_key: &str) -> Option<f64> {
    match span.get(nanos_key) {
        Some(value) => parse_unix_nanos(value),
        None => span.get(fallback_key).and_then(parse_timestamp),
    }
}

/// Match the span against the hint table, then the OpenInference kind
///
/// **Private** - internal helper for span_to_node
fn detect_node_type(name: &str, attributes: &Metadata) -> NodeType {
    let lowered = name.to_lowercase();

    for (hint, node_type) in NODE_TYPE_HINTS {
        if attributes.contains_key(*hint) || lowered.contains(hint) {
            return *node_type;
        }
    }

    attributes
        .get(OPENINFERENCE_KIND_KEY)
        .and_then(Value::as_str)
        .and_then(|kind| lookup(OPENINFERENCE_KINDS, &kind.to_uppercase()))
        .unwrap_or(NodeType::Unknown)
}

/// Flatten the OTLP attribute list into a metadata map
///
/// **Public** - OTLP values are typed wrappers
/// (`stringValue`, `intValue`, `doubleValue`, `boolValue`); anything else
/// is kept verbatim. A plain key/value object is accepted too.
pub fn parse_attributes(attributes: Option<&Value>) -> Metadata {
    let mut result = Metadata::new();

    match attributes {
        Some(Value::Array(entries)) => {
            for entry in entries.iter().filter_map(Value::as_object) {
                let Some(key) = entry.get("key").and_then(Value::as_str) else {
                    debug!("Skipping attribute without a string key");
                    continue;
                };
                let value = entry.get("value").map(unwrap_any_value).unwrap_or(Value::Null);
                result.insert(key.to_string(), value);
            }
        }
        Some(Value::Object(plain)) => {
            result.extend(plain.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Some(Value::Null) | None => {}
        Some(other) => warn!("Ignoring attributes of unexpected shape: {}", other),
    }

    result
}

/// Unwrap an OTLP `AnyValue`
fn unwrap_any_value(value: &Value) -> Value {
    let Some(typed) = value.as_object() else {
        return value.clone();
    };

    if let Some(s) = typed.get("stringValue") {
        s.clone()
    } else if let Some(int) = typed.get("intValue") {
        match int {
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| int.clone()),
            _ => int.clone(),
        }
    } else if let Some(double) = typed.get("doubleValue") {
        match double {
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| double.clone()),
            _ => double.clone(),
        }
    } else if let Some(flag) = typed.get("boolValue") {
        flag.clone()
    } else {
        value.clone()
    }
}
