//! Serialized graph document.
//!
//! This module defines the structure renderers and other tools consume.
//! Durations and heat scores are derived on the way out and ignored on
//! the way back in.

use super::model::{Edge, Metadata, Node, NodeType, OrchestrationGraph};
use crate::utils::config::DEFAULT_GRAPH_NAME;
use crate::utils::error::ParseError;
use log::debug;
use serde::{Deserialize, Serialize};

/// Top-level graph document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Workflow name
    #[serde(default = "default_graph_name")]
    pub name: String,

    #[serde(default)]
    pub nodes: Vec<NodeRecord>,

    #[serde(default)]
    pub edges: Vec<EdgeRecord>,

    /// Trace-level metadata
    #[serde(default)]
    pub metadata: Metadata,
}

/// One node entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,

    pub name: String,

    /// Type tag (`agent`, `tool`, `llm_call`, ...)
    #[serde(rename = "type", default)]
    pub node_type: NodeType,

    pub start_time: Option<f64>,

    pub end_time: Option<f64>,

    /// Derived from the timestamps; ignored when read back
    #[serde(default)]
    pub duration_ms: Option<f64>,

    /// Relative slowness within the graph; ignored when read back
    #[serde(default)]
    pub heat_score: f64,

    #[serde(default)]
    pub metadata: Metadata,
}

/// One edge entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,

    pub target: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub metadata: Metadata,
}

fn default_graph_name() -> String {
    DEFAULT_GRAPH_NAME.to_string()
}

impl OrchestrationGraph {
    /// Serialize the graph into its document form
    ///
    /// **Public** - heat scores are computed here, from the whole node set
    pub fn to_document(&self) -> GraphDocument {
        let heat = self.heat_scores();

        let nodes = self
            .nodes()
            .iter()
            .map(|n| NodeRecord {
                id: n.id.clone(),
                name: n.name.clone(),
                node_type: n.node_type,
                start_time: n.start_time,
                end_time: n.end_time,
                duration_ms: n.duration_ms(),
                heat_score: heat.get(n.id.as_str()).copied().unwrap_or(0.0),
                metadata: n.metadata.clone(),
            })
            .collect();

        let edges = self
            .edges()
            .iter()
            .map(|e| EdgeRecord {
                source: e.source_id.clone(),
                target: e.target_id.clone(),
                label: e.label.clone(),
                metadata: e.metadata.clone(),
            })
            .collect();

        GraphDocument {
            name: self.name.clone(),
            nodes,
            edges,
            metadata: self.metadata.clone(),
        }
    }

    /// Rebuild a graph from its document form
    ///
    /// **Public** - inverse of `to_document`
    pub fn from_document(document: GraphDocument) -> Self {
        let mut graph = OrchestrationGraph::new(document.name);
        graph.metadata = document.metadata;

        for record in document.nodes {
            let node = Node::new(record.id, record.name, record.node_type)
                .with_times(record.start_time, record.end_time)
                .with_metadata(record.metadata);
            graph.add_node(node);
        }

        for record in document.edges {
            let mut edge = Edge::new(record.source, record.target).with_metadata(record.metadata);
            edge.label = record.label;
            graph.add_edge(edge);
        }

        debug!(
            "Loaded graph '{}' ({} nodes, {} edges)",
            graph.name,
            graph.node_count(),
            graph.edge_count()
        );

        graph
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_document())
    }

    /// Parse a graph previously written by `to_json`
    ///
    /// # Errors
    /// * `ParseError::JsonError` - Not a valid graph document
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        let document: GraphDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(document))
    }
}
