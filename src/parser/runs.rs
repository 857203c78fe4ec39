//! Run-tree normalizer for LangChain / LangSmith exports.
//!
//! Runs nest through `child_runs`. Flat exports instead point upward with
//! `parent_run_id`; both shapes produce the same parent -> child edges.

use super::fields::{array_field, copy_fields, id_field, lookup, str_field};
use super::timestamp::parse_timestamp;
use super::Normalizer;
use crate::graph::{Edge, Node, NodeType, OrchestrationGraph};
use crate::utils::config::DEFAULT_RUN_CHAIN_NAME;
use log::{debug, warn};
use serde_json::{Map, Value};

/// `run_type` -> node type
const RUN_TYPES: &[(&str, NodeType)] = &[
    ("chain", NodeType::Agent),
    ("agent", NodeType::Agent),
    ("tool", NodeType::Tool),
    ("llm", NodeType::LlmCall),
    ("chat_model", NodeType::LlmCall),
    ("prompt", NodeType::Unknown),
];

/// Run fields carried into node metadata
const RUN_METADATA_KEYS: &[&str] = &["inputs", "outputs", "error", "tags"];

/// Normalizer for nested run trees
#[derive(Debug, Clone, Copy, Default)]
pub struct RunChainNormalizer;

impl Normalizer for RunChainNormalizer {
    fn normalize(&self, document: &Map<String, Value>) -> OrchestrationGraph {
        let name = str_field(document, &["name"]).unwrap_or(DEFAULT_RUN_CHAIN_NAME);
        let mut graph = OrchestrationGraph::new(name);

        match document.get("runs") {
            Some(Value::Array(runs)) => {
                for run in runs {
                    match run.as_object() {
                        Some(run) => add_run_tree(&mut graph, run),
                        None => warn!("Skipping run: not a JSON object"),
                    }
                }
            }
            Some(_) => warn!("'runs' is not an array; no runs extracted"),
            // A bare run document is its own single top-level run
            None => add_run_tree(&mut graph, document),
        }

        debug!(
            "Run tree produced {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }
}

/// Add a top-level run and all of its descendants
///
/// **Private** - uses an explicit stack so deep trees cannot overflow
fn add_run_tree(graph: &mut OrchestrationGraph, root: &Map<String, Value>) {
    let root_id = add_run(graph, root);
    if let Some(parent_id) = id_field(root, &["parent_run_id"]) {
        graph.add_edge(Edge::new(parent_id, root_id.clone()));
    }

    // (parent id, child run)
    let mut stack: Vec<(String, &Map<String, Value>)> = Vec::new();
    push_children(&mut stack, &root_id, root);

    while let Some((parent_id, run)) = stack.pop() {
        let run_id = add_run(graph, run);
        graph.add_edge(Edge::new(parent_id, run_id.clone()));
        push_children(&mut stack, &run_id, run);
    }
}

/// Queue `child_runs` so they pop in document order
fn push_children<'a>(
    stack: &mut Vec<(String, &'a Map<String, Value>)>,
    parent_id: &str,
    run: &'a Map<String, Value>,
) {
    let children = array_field(run, &["child_runs"]);
    for child in children.iter().rev() {
        match child.as_object() {
            Some(child) => stack.push((parent_id.to_string(), child)),
            None => warn!("Skipping child run of {}: not a JSON object", parent_id),
        }
    }
}

/// Convert one run into a node and return its id
fn add_run(graph: &mut OrchestrationGraph, run: &Map<String, Value>) -> String {
    let id = id_field(run, &["id", "run_id"]).unwrap_or_else(|| graph.synthetic_id("run"));
    let run_type = str_field(run, &["run_type"]);
    let name = str_field(run, &["name"]).or(run_type).unwrap_or("unknown");
    let node_type = run_type
        .and_then(|kind| lookup(RUN_TYPES, kind))
        .unwrap_or(NodeType::Unknown);

    let start_time = run.get("start_time").and_then(parse_timestamp);
    let end_time = run.get("end_time").and_then(parse_timestamp);

    let node = Node::new(id.clone(), name, node_type)
        .with_times(start_time, end_time)
        .with_metadata(copy_fields(run, RUN_METADATA_KEYS));
    graph.add_node(node);
    id
}
