//! Terminal output rendering for trace diffs.
//!
//! Produces the human-readable comparison printed by `dissect diff`.

use super::schema::{EdgeStatus, NodeDiff, TraceDiff};

/// Render a human-readable summary of a trace diff
pub fn format_diff(diff: &TraceDiff) -> String {
    let mut lines = vec![
        format!("Comparing: {} → {}", diff.old_name, diff.new_name),
        String::new(),
    ];

    if !diff.has_changes() {
        lines.push("✓ No differences found.".to_string());
        return lines.join("\n");
    }

    lines.push(format!(
        "  Nodes: +{} added, -{} removed, ~{} changed",
        diff.added_nodes().len(),
        diff.removed_nodes().len(),
        diff.changed_nodes().len()
    ));
    lines.push(format!(
        "  Edges: +{} added, -{} removed",
        diff.added_edges().len(),
        diff.removed_edges().len()
    ));
    lines.push(String::new());

    let regressions = diff.regressions();
    if !regressions.is_empty() {
        lines.extend(render_duration_section("⚠ Duration Regressions:", &regressions, "↑"));
    }

    let improvements = diff.improvements();
    if !improvements.is_empty() {
        lines.extend(render_duration_section("✓ Duration Improvements:", &improvements, "↓"));
    }

    let added = diff.added_nodes();
    if !added.is_empty() {
        lines.extend(render_node_list("+ Added Nodes:", &added, "+", |d| d.new_duration_ms));
    }

    let removed = diff.removed_nodes();
    if !removed.is_empty() {
        lines.extend(render_node_list("- Removed Nodes:", &removed, "-", |d| d.old_duration_ms));
    }

    if !diff.edge_diffs.is_empty() {
        lines.push("Edge Changes:".to_string());
        for edge in &diff.edge_diffs {
            let symbol = match edge.status {
                EdgeStatus::Added => "+",
                EdgeStatus::Removed => "-",
            };
            lines.push(format!("  {} {} → {}", symbol, edge.source, edge.target));
        }
    }

    lines.join("\n")
}

fn render_duration_section(title: &str, nodes: &[&NodeDiff], arrow: &str) -> Vec<String> {
    let mut lines = vec![title.to_string()];
    for d in nodes {
        let pct = match d.duration_change_pct {
            Some(pct) if pct != 0.0 => format!(" ({:+.1}%)", pct),
            _ => String::new(),
        };
        lines.push(format!(
            "  {} {}: {:.0}ms → {:.0}ms ({:+.0}ms{})",
            arrow,
            d.name,
            d.old_duration_ms.unwrap_or_default(),
            d.new_duration_ms.unwrap_or_default(),
            d.duration_change_ms.unwrap_or_default(),
            pct
        ));
    }
    lines.push(String::new());
    lines
}

fn render_node_list(
    title: &str,
    nodes: &[&NodeDiff],
    symbol: &str,
    duration: impl Fn(&NodeDiff) -> Option<f64>,
) -> Vec<String> {
    let mut lines = vec![title.to_string()];
    for d in nodes {
        let suffix = match duration(*d) {
            Some(ms) if ms != 0.0 => format!(" ({:.0}ms)", ms),
            _ => String::new(),
        };
        lines.push(format!("  {} {}{}", symbol, d.name, suffix));
    }
    lines.push(String::new());
    lines
}
