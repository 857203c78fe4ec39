//! Core diff engine implementation.
//! Compares two graphs node-by-name and edge-by-name-pair.

use super::schema::{DiffStatus, EdgeDiff, EdgeStatus, NodeDiff, TraceDiff};
use crate::graph::{Node, OrchestrationGraph};
use crate::utils::config::DURATION_EPSILON_MS;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// (source name, target name)
type EdgeKey = (String, String);

/// Compare two graphs and report their differences
///
/// Nodes are matched by name, not id, since ids differ between runs.
///
/// # Arguments
/// * `old` - The baseline graph
/// * `new` - The graph to compare against it
///
/// # Returns
/// A `TraceDiff` with node diffs sorted by name and edge diffs grouped
/// added-then-removed
///
/// # Example
/// ```ignore
/// use dissect_trace::diff::diff_graphs;
/// use dissect_trace::parser::parse_trace_file;
///
/// let old = parse_trace_file("before.json")?;
/// let new = parse_trace_file("after.json")?;
/// let diff = diff_graphs(&old, &new);
/// println!("{} regressions", diff.regressions().len());
/// ```
pub fn diff_graphs(old: &OrchestrationGraph, new: &OrchestrationGraph) -> TraceDiff {
    let old_by_name = nodes_by_name(old);
    let new_by_name = nodes_by_name(new);

    let names: BTreeSet<&str> = old_by_name.keys().chain(new_by_name.keys()).copied().collect();

    let node_diffs: Vec<NodeDiff> = names
        .into_iter()
        .filter_map(|name| {
            match (old_by_name.get(name), new_by_name.get(name)) {
                (Some(old_node), None) => Some(NodeDiff {
                    node_id: old_node.id.clone(),
                    name: name.to_string(),
                    status: DiffStatus::Removed,
                    old_duration_ms: old_node.duration_ms(),
                    new_duration_ms: None,
                    duration_change_ms: None,
                    duration_change_pct: None,
                }),
                (None, Some(new_node)) => Some(NodeDiff {
                    node_id: new_node.id.clone(),
                    name: name.to_string(),
                    status: DiffStatus::Added,
                    old_duration_ms: None,
                    new_duration_ms: new_node.duration_ms(),
                    duration_change_ms: None,
                    duration_change_pct: None,
                }),
                (Some(old_node), Some(new_node)) => Some(compare_durations(name, old_node, new_node)),
                (None, None) => None,
            }
        })
        .collect();

    let old_edges = edge_labels(old);
    let new_edges = edge_labels(new);

    let added = new_edges
        .iter()
        .filter(|(key, _)| !old_edges.contains_key(*key))
        .map(|(key, label)| edge_diff(key, label, EdgeStatus::Added));
    let removed = old_edges
        .iter()
        .filter(|(key, _)| !new_edges.contains_key(*key))
        .map(|(key, label)| edge_diff(key, label, EdgeStatus::Removed));
    let edge_diffs: Vec<EdgeDiff> = added.chain(removed).collect();

    let diff = TraceDiff {
        old_name: old.name.clone(),
        new_name: new.name.clone(),
        node_diffs,
        edge_diffs,
    };

    debug!(
        "Diff '{}' -> '{}': {} node diffs, {} edge diffs",
        diff.old_name,
        diff.new_name,
        diff.node_diffs.len(),
        diff.edge_diffs.len()
    );
    diff
}

/// Name -> node, the last node with a given name wins
fn nodes_by_name(graph: &OrchestrationGraph) -> BTreeMap<&str, &Node> {
    graph.nodes().iter().map(|n| (n.name.as_str(), n)).collect()
}

/// Edge name pairs with the label of the first edge for each pair
///
/// **Private** - edges with a dangling endpoint are skipped
fn edge_labels(graph: &OrchestrationGraph) -> BTreeMap<EdgeKey, Option<String>> {
    let mut keys = BTreeMap::new();
    for edge in graph.edges() {
        let (Some(source), Some(target)) = (graph.node(&edge.source_id), graph.node(&edge.target_id))
        else {
            continue;
        };
        keys.entry((source.name.clone(), target.name.clone()))
            .or_insert_with(|| edge.label.clone());
    }
    keys
}

fn edge_diff(key: &EdgeKey, label: &Option<String>, status: EdgeStatus) -> EdgeDiff {
    EdgeDiff {
        source: key.0.clone(),
        target: key.1.clone(),
        status,
        label: label.clone(),
    }
}

/// Compare a node present in both traces
///
/// **Private** - internal helper for diff_graphs
fn compare_durations(name: &str, old_node: &Node, new_node: &Node) -> NodeDiff {
    let old_duration = old_node.duration_ms();
    let new_duration = new_node.duration_ms();

    let (change, pct) = match (old_duration, new_duration) {
        (Some(old_ms), Some(new_ms)) => {
            let change = new_ms - old_ms;
            (Some(change), percentage_change(change, old_ms))
        }
        _ => (None, None),
    };

    let status = match change {
        Some(change) if change.abs() > DURATION_EPSILON_MS => DiffStatus::Changed,
        _ => DiffStatus::Unchanged,
    };

    NodeDiff {
        node_id: new_node.id.clone(),
        name: name.to_string(),
        status,
        old_duration_ms: old_duration,
        new_duration_ms: new_duration,
        duration_change_ms: change,
        duration_change_pct: pct,
    }
}

/// Percentage of `change` relative to `baseline`
///
/// Undefined (None) unless the baseline is positive.
pub fn percentage_change(change: f64, baseline: f64) -> Option<f64> {
    if baseline > 0.0 {
        Some(change / baseline * 100.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, NodeType};

    fn timed(id: &str, name: &str, ms: f64) -> Node {
        Node::new(id, name, NodeType::Agent).with_times(Some(0.0), Some(ms / 1000.0))
    }

    #[test]
    fn test_percentage_change() {
        assert_eq!(percentage_change(50.0, 100.0), Some(50.0));
        assert_eq!(percentage_change(-25.0, 100.0), Some(-25.0));
        assert_eq!(percentage_change(10.0, 0.0), None);
    }

    #[test]
    fn test_epsilon_keeps_tiny_changes_unchanged() {
        let mut old = OrchestrationGraph::new("a");
        old.add_node(timed("x", "X", 100.0));
        let mut new = OrchestrationGraph::new("b");
        new.add_node(timed("y", "X", 100.005));

        let diff = diff_graphs(&old, &new);
        assert_eq!(diff.node_diffs[0].status, DiffStatus::Unchanged);
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_untimed_nodes_are_unchanged() {
        let mut old = OrchestrationGraph::new("a");
        old.add_node(Node::new("x", "X", NodeType::Tool));
        let mut new = OrchestrationGraph::new("b");
        new.add_node(timed("x", "X", 10.0));

        let diff = diff_graphs(&old, &new);
        let node = &diff.node_diffs[0];
        assert_eq!(node.status, DiffStatus::Unchanged);
        assert_eq!(node.duration_change_ms, None);
        assert_eq!(node.new_duration_ms, Some(10.0));
    }

    #[test]
    fn test_dangling_edges_ignored_and_labels_kept() {
        let mut old = OrchestrationGraph::new("a");
        old.add_node(timed("1", "A", 1.0));
        old.add_edge(Edge::new("1", "ghost"));

        let mut new = old.clone();
        new.add_node(timed("2", "B", 1.0));
        new.add_edge(Edge::new("1", "2").with_label("calls"));

        let diff = diff_graphs(&old, &new);
        assert_eq!(diff.edge_diffs.len(), 1);
        assert_eq!(diff.edge_diffs[0].label.as_deref(), Some("calls"));
        assert_eq!(diff.added_nodes().len(), 1);
    }
}
