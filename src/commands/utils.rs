use crate::graph::OrchestrationGraph;
use crate::output::read_graph;
use crate::parser::parse_trace;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use log::debug;
use serde_json::Value;
use std::path::Path;

/// Load a graph from either a raw trace or a saved graph document
///
/// **Public** - lets `diff` compare traces and `visualize --format json` output alike
///
/// A top-level object with `nodes` and `edges` arrays is read as a graph
/// document; anything else goes through format detection.
pub fn load_graph(path: &Path) -> Result<OrchestrationGraph> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    if is_graph_document(&value) {
        debug!("{} is a saved graph document", path.display());
        return read_graph(path)
            .with_context(|| format!("Invalid graph document: {}", path.display()));
    }

    parse_trace(&value).with_context(|| format!("Failed to parse trace {}", path.display()))
}

fn is_graph_document(value: &Value) -> bool {
    value.get("nodes").is_some_and(Value::is_array) && value.get("edges").is_some_and(Value::is_array)
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Dissect Graph Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  name: string              - Workflow name");
        println!("  metadata: object          - Trace-level metadata (incl. source_format)");
        println!("  nodes: array              - One entry per step");
        println!("    id: string              - Unique node id");
        println!("    name: string            - Display name, the diff matching key");
        println!("    type: string            - agent | tool | llm_call | user_input | output | unknown");
        println!("    start_time: number?     - Epoch seconds");
        println!("    end_time: number?       - Epoch seconds");
        println!("    duration_ms: number?    - Derived when both timestamps exist");
        println!("    heat_score: number      - 0.0 (fastest) to 1.0 (slowest)");
        println!("    metadata: object        - Dialect-specific attributes");
        println!("  edges: array              - Directed parent -> child links");
        println!("    source: string          - Source node id");
        println!("    target: string          - Target node id");
        println!("    label: string?          - Relationship label");
        println!("    metadata: object        - Edge attributes");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Dissect v{}", env!("CARGO_PKG_VERSION"));
    println!("Graph Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Normalizes multi-agent workflow traces into one graph for");
    println!("critical path analysis, diffing and visualization.");
}
