//! Orchestration graph model.
//!
//! Nodes represent agents, tools, LLM calls, user inputs and outputs.
//! Edges represent control flow (parent -> child) or conversation order.
//! Every trace dialect is normalized into this one structure.

use super::critical_path::{find_critical_path, CriticalPath};
use crate::utils::config::DEFAULT_GRAPH_NAME;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Free-form metadata attached to nodes, edges and graphs
pub type Metadata = Map<String, Value>;

/// Kind of execution unit a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Agent,
    Tool,
    LlmCall,
    UserInput,
    Output,
    #[default]
    #[serde(other)]
    Unknown,
}

impl NodeType {
    /// Tag used in serialized graphs
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Agent => "agent",
            NodeType::Tool => "tool",
            NodeType::LlmCall => "llm_call",
            NodeType::UserInput => "user_input",
            NodeType::Output => "output",
            NodeType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = Infallible;

    /// Unrecognized tags degrade to `Unknown` rather than failing
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "agent" => NodeType::Agent,
            "tool" => NodeType::Tool,
            "llm_call" => NodeType::LlmCall,
            "user_input" => NodeType::UserInput,
            "output" => NodeType::Output,
            _ => NodeType::Unknown,
        })
    }
}

/// A node in the orchestration graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Identifier, unique within one graph
    pub id: String,

    /// Human-readable name (the key used when diffing two runs)
    pub name: String,

    pub node_type: NodeType,

    /// Start time in epoch seconds
    pub start_time: Option<f64>,

    /// End time in epoch seconds
    pub end_time: Option<f64>,

    pub metadata: Metadata,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type,
            start_time: None,
            end_time: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_times(mut self, start_time: Option<f64>, end_time: Option<f64>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Duration in milliseconds
    ///
    /// `None` unless both timestamps are known. A missing duration is
    /// not the same thing as a zero duration.
    pub fn duration_ms(&self) -> Option<f64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((end - start) * 1000.0),
            _ => None,
        }
    }
}

/// A directed edge between two nodes
///
/// Endpoints are not validated: an edge may name an id the graph
/// does not (yet) contain.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub label: Option<String>,
    pub metadata: Metadata,
}

impl Edge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            label: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Graph representation of an AI agent orchestration workflow
///
/// **Public** - the structure every parser produces and every analyzer reads
///
/// Nodes are stored in first-insertion order; that order is the
/// canonical iteration order for roots, leaves and serialized output.
/// Edges keep their insertion order as well.
#[derive(Debug, Clone)]
pub struct OrchestrationGraph {
    pub name: String,
    pub metadata: Metadata,
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
}

impl Default for OrchestrationGraph {
    fn default() -> Self {
        Self::new(DEFAULT_GRAPH_NAME)
    }
}

impl OrchestrationGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Metadata::new(),
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Add a node, replacing any node with the same id
    ///
    /// The replacement keeps the position of the node it replaces.
    ///
    /// # Returns
    /// The node that was replaced, if any
    pub fn add_node(&mut self, node: Node) -> Option<Node> {
        if let Some(&slot) = self.index.get(&node.id) {
            return Some(std::mem::replace(&mut self.nodes[slot], node));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        None
    }

    /// Append an edge
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Position of a node in iteration order
    pub(crate) fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// All nodes, in iteration order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes this node points to, in edge order
    ///
    /// Targets missing from the node table are skipped.
    pub fn children(&self, id: &str) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|e| e.source_id == id)
            .filter_map(|e| self.node(&e.target_id))
            .collect()
    }

    /// Nodes pointing at this node, in edge order
    pub fn parents(&self, id: &str) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|e| e.target_id == id)
            .filter_map(|e| self.node(&e.source_id))
            .collect()
    }

    /// Nodes with no incoming edges (entry points)
    pub fn root_nodes(&self) -> Vec<&Node> {
        let targets: HashSet<&str> = self.edges.iter().map(|e| e.target_id.as_str()).collect();
        self.nodes
            .iter()
            .filter(|n| !targets.contains(n.id.as_str()))
            .collect()
    }

    /// Nodes with no outgoing edges (exit points)
    pub fn leaf_nodes(&self) -> Vec<&Node> {
        let sources: HashSet<&str> = self.edges.iter().map(|e| e.source_id.as_str()).collect();
        self.nodes
            .iter()
            .filter(|n| !sources.contains(n.id.as_str()))
            .collect()
    }

    /// Path with the longest total duration
    ///
    /// **Public** - convenience wrapper over `find_critical_path`
    pub fn critical_path(&self) -> CriticalPath<'_> {
        find_critical_path(self)
    }

    /// Heat score (0.0 - 1.0) for every node, keyed by id
    ///
    /// Scores are relative to the durations present in this graph:
    /// the fastest timed node gets 0.0 and the slowest 1.0. When fewer
    /// than two distinct durations exist, every node scores 0.0.
    /// Nodes without a duration always score 0.0.
    pub fn heat_scores(&self) -> HashMap<&str, f64> {
        let (min, max) = self
            .nodes
            .iter()
            .filter_map(Node::duration_ms)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
                (lo.min(d), hi.max(d))
            });
        let range = max - min;

        self.nodes
            .iter()
            .map(|n| {
                let heat = match n.duration_ms() {
                    Some(d) if range > 0.0 => (d - min) / range,
                    _ => 0.0,
                };
                (n.id.as_str(), heat)
            })
            .collect()
    }

    /// Generate an id that no node in this graph uses yet
    ///
    /// Derived from the current node count, so ids are unique within
    /// one ingestion but not stable across two parses of a document.
    pub fn synthetic_id(&self, prefix: &str) -> String {
        let mut counter = self.nodes.len();
        loop {
            let candidate = format!("{}_{}", prefix, counter);
            if !self.contains_node(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}
