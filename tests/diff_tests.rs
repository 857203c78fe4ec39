use dissect_trace::diff::{diff_graphs, format_diff, DiffStatus, EdgeStatus};
use dissect_trace::graph::{Edge, Node, NodeType, OrchestrationGraph};
use pretty_assertions::assert_eq;
use serde_json::json;

fn graph_with(name: &str, id_prefix: &str, durations: &[(&str, f64)]) -> OrchestrationGraph {
    let mut graph = OrchestrationGraph::new(name);
    for (node_name, ms) in durations {
        let id = format!("{}-{}", id_prefix, node_name);
        graph.add_node(
            Node::new(id, *node_name, NodeType::Agent).with_times(Some(100.0), Some(100.0 + ms / 1000.0)),
        );
    }
    graph
}

fn link(graph: &mut OrchestrationGraph, prefix: &str, source: &str, target: &str) {
    graph.add_edge(Edge::new(
        format!("{}-{}", prefix, source),
        format!("{}-{}", prefix, target),
    ));
}

#[test]
fn test_matching_is_by_name_not_id() {
    let mut old = graph_with("run-1", "x", &[("Planner", 100.0), ("Search", 250.0)]);
    link(&mut old, "x", "Planner", "Search");
    let mut new = graph_with("run-2", "y", &[("Planner", 100.0), ("Search", 250.0)]);
    link(&mut new, "y", "Planner", "Search");

    let diff = diff_graphs(&old, &new);

    assert!(!diff.has_changes());
    assert_eq!(diff.unchanged_nodes().len(), 2);
    assert!(diff.edge_diffs.is_empty());
    assert_eq!(diff.node_diffs[0].node_id, "y-Planner");
}

#[test]
fn test_regression_classification() {
    let old = graph_with("old", "o", &[("Writer", 1000.0)]);
    let new = graph_with("new", "n", &[("Writer", 2000.0)]);

    let diff = diff_graphs(&old, &new);
    let writer = &diff.node_diffs[0];

    assert_eq!(writer.status, DiffStatus::Changed);
    assert!(writer.is_regression());
    assert!(!writer.is_improvement());
    assert!((writer.duration_change_ms.unwrap() - 1000.0).abs() < 1e-6);
    assert!((writer.duration_change_pct.unwrap() - 100.0).abs() < 1e-6);
    assert_eq!(diff.regressions().len(), 1);
    assert!(diff.improvements().is_empty());
}

#[test]
fn test_improvement_and_zero_baseline() {
    let old = graph_with("old", "o", &[("Fast", 400.0), ("Instant", 0.0)]);
    let new = graph_with("new", "n", &[("Fast", 100.0), ("Instant", 50.0)]);

    let diff = diff_graphs(&old, &new);
    let fast = diff.node_diffs.iter().find(|d| d.name == "Fast").unwrap();
    let instant = diff.node_diffs.iter().find(|d| d.name == "Instant").unwrap();

    assert!(fast.is_improvement());
    assert!((fast.duration_change_pct.unwrap() + 75.0).abs() < 1e-6);
    assert!(instant.is_regression());
    assert_eq!(instant.duration_change_pct, None);
    // Only regressions with a baseline contribute a percentage
    assert_eq!(diff.worst_regression_pct(), None);
}

#[test]
fn test_worst_regression_pct_picks_largest() {
    let old = graph_with("old", "o", &[("A", 100.0), ("B", 200.0), ("C", 400.0)]);
    let new = graph_with("new", "n", &[("A", 150.0), ("B", 500.0), ("C", 100.0)]);

    let worst = diff_graphs(&old, &new).worst_regression_pct().unwrap();
    assert!((worst - 150.0).abs() < 1e-6);
}

#[test]
fn test_added_and_removed_nodes_sorted_by_name() {
    let old = graph_with("old", "o", &[("Zeta", 1.0), ("Alpha", 1.0)]);
    let new = graph_with("new", "n", &[("Alpha", 1.0), ("Beta", 5.0)]);

    let diff = diff_graphs(&old, &new);
    let names: Vec<&str> = diff.node_diffs.iter().map(|d| d.name.as_str()).collect();

    assert_eq!(names, vec!["Alpha", "Beta", "Zeta"]);
    assert_eq!(diff.added_nodes()[0].name, "Beta");
    assert_eq!(diff.added_nodes()[0].old_duration_ms, None);
    assert_eq!(diff.removed_nodes()[0].name, "Zeta");
    assert_eq!(diff.removed_nodes()[0].node_id, "o-Zeta");
    assert!(diff.has_changes());
}

#[test]
fn test_duplicate_names_last_node_wins() {
    let mut old = OrchestrationGraph::new("old");
    old.add_node(Node::new("w1", "Worker", NodeType::Tool).with_times(Some(10.0), Some(10.1)));
    old.add_node(Node::new("w2", "Worker", NodeType::Tool).with_times(Some(20.0), Some(20.5)));
    let new = graph_with("new", "n", &[("Worker", 500.0)]);

    let diff = diff_graphs(&old, &new);

    assert_eq!(diff.node_diffs.len(), 1);
    let worker = &diff.node_diffs[0];
    assert_eq!(worker.status, DiffStatus::Unchanged);
    assert!((worker.old_duration_ms.unwrap() - 500.0).abs() < 1e-6);

    // Removed entries also report the last node carrying the name
    let reversed = diff_graphs(&old, &OrchestrationGraph::new("empty"));
    assert_eq!(reversed.removed_nodes()[0].node_id, "w2");
}

#[test]
fn test_edge_only_in_new() {
    let old = graph_with("old", "o", &[("A", 10.0), ("B", 10.0)]);
    let mut new = graph_with("new", "n", &[("A", 10.0), ("B", 10.0)]);
    link(&mut new, "n", "A", "B");

    let diff = diff_graphs(&old, &new);
    assert_eq!(diff.added_edges().len(), 1);
    assert_eq!(diff.added_edges()[0].source, "A");
    assert_eq!(diff.added_edges()[0].target, "B");
    assert!(diff.removed_edges().is_empty());
    assert!(diff.changed_nodes().is_empty());
    assert!(diff.has_changes());

    // Reversing the comparison turns it into a removal
    let reversed = diff_graphs(&new, &old);
    assert_eq!(reversed.removed_edges().len(), 1);
    assert_eq!(reversed.edge_diffs[0].status, EdgeStatus::Removed);
    assert_eq!(reversed.unchanged_nodes().len(), 2);
}

#[test]
fn test_added_edges_precede_removed() {
    let mut old = graph_with("old", "o", &[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
    link(&mut old, "o", "A", "C");
    let mut new = graph_with("new", "n", &[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
    link(&mut new, "n", "A", "B");

    let diff = diff_graphs(&old, &new);
    let statuses: Vec<EdgeStatus> = diff.edge_diffs.iter().map(|e| e.status).collect();
    assert_eq!(statuses, vec![EdgeStatus::Added, EdgeStatus::Removed]);
}

#[test]
fn test_diff_serialization_shape() {
    let old = graph_with("old", "o", &[("A", 1000.0)]);
    let new = graph_with("new", "n", &[("A", 2000.0)]);

    let value = serde_json::to_value(diff_graphs(&old, &new)).unwrap();
    assert_eq!(value["old_name"], json!("old"));
    assert_eq!(value["new_name"], json!("new"));
    assert_eq!(value["node_diffs"][0]["status"], json!("changed"));
    assert_eq!(value["node_diffs"][0]["node_id"], json!("n-A"));
    assert_eq!(value["edge_diffs"], json!([]));
}

#[test]
fn test_format_diff_reports_regression() {
    let old = graph_with("before", "o", &[("Writer", 1000.0)]);
    let new = graph_with("after", "n", &[("Writer", 2000.0)]);

    let text = format_diff(&diff_graphs(&old, &new));
    assert!(text.contains("Comparing: before → after"));
    assert!(text.contains("⚠ Duration Regressions:"));
    assert!(text.contains("  ↑ Writer: 1000ms → 2000ms (+1000ms (+100.0%))"));
}
