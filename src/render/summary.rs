//! Plain-text trace summary for the terminal.

use crate::graph::{Node, OrchestrationGraph};
use crate::parser::SOURCE_FORMAT_KEY;

/// Summarize a parsed trace
///
/// **Public** - printed by `dissect trace`
///
/// # Arguments
/// * `graph` - Graph to summarize
/// * `max_lines` - Rows in the slowest-nodes table
pub fn trace_summary(graph: &OrchestrationGraph, max_lines: usize) -> String {
    let mut lines = vec!["✓ Parsed successfully!".to_string()];
    lines.push(format!("  Name: {}", graph.name));
    if let Some(format) = graph.metadata.get(SOURCE_FORMAT_KEY).and_then(|v| v.as_str()) {
        lines.push(format!("  Format: {}", format));
    }
    lines.push(format!("  Nodes: {}", graph.node_count()));
    lines.push(format!("  Edges: {}", graph.edge_count()));

    let roots: Vec<&str> = graph.root_nodes().iter().map(|n| n.name.as_str()).collect();
    if !roots.is_empty() {
        lines.push(format!("  Roots: {}", roots.join(", ")));
    }

    let path = graph.critical_path();
    if !path.is_empty() {
        lines.push(String::new());
        lines.push(format!("  Critical Path ({:.0}ms):", path.total_duration_ms));
        for node in &path.nodes {
            lines.push(format!("    → {}{}", node.name, duration_suffix(node)));
        }
    }

    let table = slowest_nodes_table(graph, max_lines);
    if !table.is_empty() {
        lines.push(String::new());
        lines.extend(table);
    }

    lines.join("\n")
}

fn duration_suffix(node: &Node) -> String {
    match node.duration_ms() {
        Some(ms) if ms != 0.0 => format!(" ({:.0}ms)", ms),
        _ => String::new(),
    }
}

/// Timed nodes, slowest first, with their heat scores
fn slowest_nodes_table(graph: &OrchestrationGraph, max_lines: usize) -> Vec<String> {
    let mut timed: Vec<(&Node, f64)> = graph
        .nodes()
        .iter()
        .filter_map(|n| n.duration_ms().map(|d| (n, d)))
        .collect();
    if timed.is_empty() || max_lines == 0 {
        return Vec::new();
    }
    timed.sort_by(|a, b| b.1.total_cmp(&a.1));

    let heat = graph.heat_scores();
    let mut lines = vec![
        "  SLOWEST NODES".to_string(),
        "  ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┳━━━━━━━━━━━━┳━━━━━━━━━━━━┳━━━━━━━━┓".to_string(),
        format!("  ┃ {:<40} ┃ {:^10} ┃ {:^10} ┃ {:^6} ┃", "Node", "TYPE", "MS", "HEAT"),
        "  ┣━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━╋━━━━━━━━━━━━╋━━━━━━━━━━━━╋━━━━━━━━┫".to_string(),
    ];

    for (node, duration) in timed.iter().take(max_lines) {
        let name = if node.name.chars().count() > 40 {
            let head: String = node.name.chars().take(37).collect();
            format!("{}...", head)
        } else {
            node.name.clone()
        };
        let score = heat.get(node.id.as_str()).copied().unwrap_or(0.0);
        lines.push(format!(
            "  ┃ {:<40} ┃ {:<10} ┃ {:>10.1} ┃ {:>6.2} ┃",
            name,
            node.node_type.as_str(),
            duration,
            score
        ));
    }

    lines.push(
        "  ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┻━━━━━━━━━━━━┻━━━━━━━━━━━━┻━━━━━━━━┛".to_string(),
    );

    if timed.len() > max_lines {
        lines.push(format!("   (Showing top {} of {} timed nodes)", max_lines, timed.len()));
    }
    lines
}
