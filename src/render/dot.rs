//! Graphviz DOT export.

use crate::graph::{NodeType, OrchestrationGraph};

fn fill_color(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Agent => "#E3F2FD",
        NodeType::Tool => "#FFF3E0",
        NodeType::LlmCall => "#F3E5F5",
        NodeType::UserInput => "#E8F5E9",
        NodeType::Output => "#FFEBEE",
        NodeType::Unknown => "#F5F5F5",
    }
}

/// Export a graph as a Graphviz `digraph`
///
/// **Public** - ids and labels are quoted, embedded quotes escaped
pub fn export_dot(graph: &OrchestrationGraph) -> String {
    let mut lines = vec![
        format!("digraph \"{}\" {{", escape(&graph.name)),
        "    rankdir=TB;".to_string(),
        "    node [shape=box, style=\"rounded,filled\", fontname=\"Arial\"];".to_string(),
        "    edge [fontname=\"Arial\", fontsize=10];".to_string(),
        String::new(),
    ];

    for node in graph.nodes() {
        let name = escape(&node.name);
        let label = match node.duration_ms() {
            Some(ms) if ms != 0.0 => format!("{}\\n{:.0}ms", name, ms),
            _ => name,
        };
        lines.push(format!(
            "    \"{}\" [label=\"{}\", fillcolor=\"{}\"];",
            escape(&node.id),
            label,
            fill_color(node.node_type)
        ));
    }

    lines.push(String::new());

    for edge in graph.edges() {
        let source = escape(&edge.source_id);
        let target = escape(&edge.target_id);
        match &edge.label {
            Some(label) => lines.push(format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];",
                source,
                target,
                escape(label)
            )),
            None => lines.push(format!("    \"{}\" -> \"{}\";", source, target)),
        }
    }

    lines.push("}".to_string());
    lines.join("\n")
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
