//! Orchestration graph: model, serialized schema and critical path.
//!
//! This module handles:
//! - The canonical node/edge representation every trace normalizes into
//! - Topology queries (children, parents, roots, leaves)
//! - Heat scores and the serialized graph document
//! - Critical path analysis

pub mod critical_path;
pub mod model;
pub mod schema;

// Re-export main types
pub use critical_path::{find_critical_path, CriticalPath};
pub use model::{Edge, Metadata, Node, NodeType, OrchestrationGraph};
pub use schema::{EdgeRecord, GraphDocument, NodeRecord};
