//! Schema definitions for trace diffs.
//!
//! Defines the structures that represent differences between two graphs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a node compares between the old and new trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

/// Edge differences only ever add or remove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStatus {
    Added,
    Removed,
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiffStatus::Added => "added",
            DiffStatus::Removed => "removed",
            DiffStatus::Changed => "changed",
            DiffStatus::Unchanged => "unchanged",
        };
        f.write_str(label)
    }
}

/// Difference for a single node, matched by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDiff {
    /// Id of the new node, or the old one when removed
    pub node_id: String,

    /// Matching key
    pub name: String,

    pub status: DiffStatus,

    pub old_duration_ms: Option<f64>,

    pub new_duration_ms: Option<f64>,

    /// new - old, when both durations are known
    pub duration_change_ms: Option<f64>,

    /// Change relative to the old duration, when the old duration is positive
    pub duration_change_pct: Option<f64>,
}

impl NodeDiff {
    /// True if the node got slower
    pub fn is_regression(&self) -> bool {
        self.status == DiffStatus::Changed && self.duration_change_ms.is_some_and(|d| d > 0.0)
    }

    /// True if the node got faster
    pub fn is_improvement(&self) -> bool {
        self.status == DiffStatus::Changed && self.duration_change_ms.is_some_and(|d| d < 0.0)
    }
}

/// An edge present in only one of the traces, keyed by node names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDiff {
    /// Source node name
    pub source: String,

    /// Target node name
    pub target: String,

    pub status: EdgeStatus,

    /// Label of the first matching edge in its trace
    pub label: Option<String>,
}

/// Complete diff between two traces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDiff {
    pub old_name: String,
    pub new_name: String,

    /// One entry per distinct node name, sorted by name
    pub node_diffs: Vec<NodeDiff>,

    /// Added edges first, then removed; each group sorted
    pub edge_diffs: Vec<EdgeDiff>,
}

impl TraceDiff {
    fn nodes_with(&self, status: DiffStatus) -> Vec<&NodeDiff> {
        self.node_diffs.iter().filter(|d| d.status == status).collect()
    }

    fn edges_with(&self, status: EdgeStatus) -> Vec<&EdgeDiff> {
        self.edge_diffs.iter().filter(|d| d.status == status).collect()
    }

    pub fn added_nodes(&self) -> Vec<&NodeDiff> {
        self.nodes_with(DiffStatus::Added)
    }

    pub fn removed_nodes(&self) -> Vec<&NodeDiff> {
        self.nodes_with(DiffStatus::Removed)
    }

    pub fn changed_nodes(&self) -> Vec<&NodeDiff> {
        self.nodes_with(DiffStatus::Changed)
    }

    pub fn unchanged_nodes(&self) -> Vec<&NodeDiff> {
        self.nodes_with(DiffStatus::Unchanged)
    }

    pub fn regressions(&self) -> Vec<&NodeDiff> {
        self.node_diffs.iter().filter(|d| d.is_regression()).collect()
    }

    pub fn improvements(&self) -> Vec<&NodeDiff> {
        self.node_diffs.iter().filter(|d| d.is_improvement()).collect()
    }

    pub fn added_edges(&self) -> Vec<&EdgeDiff> {
        self.edges_with(EdgeStatus::Added)
    }

    pub fn removed_edges(&self) -> Vec<&EdgeDiff> {
        self.edges_with(EdgeStatus::Removed)
    }

    /// Any node added, removed or changed, or any edge difference
    pub fn has_changes(&self) -> bool {
        !self.edge_diffs.is_empty()
            || self
                .node_diffs
                .iter()
                .any(|d| d.status != DiffStatus::Unchanged)
    }

    /// Largest regression percentage, if any regression has one
    pub fn worst_regression_pct(&self) -> Option<f64> {
        self.regressions()
            .into_iter()
            .filter_map(|d| d.duration_change_pct)
            .fold(None, |worst: Option<f64>, pct| {
                Some(worst.map_or(pct, |w| w.max(pct)))
            })
    }
}
