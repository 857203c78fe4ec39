//! Mermaid flowchart export.

use crate::graph::{NodeType, OrchestrationGraph};

/// Mermaid class attached to each node type
fn class_suffix(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Agent => ":::agent",
        NodeType::Tool => ":::tool",
        NodeType::LlmCall => ":::llm",
        NodeType::UserInput => ":::input",
        NodeType::Output => ":::output",
        NodeType::Unknown => "",
    }
}

const CLASS_DEFINITIONS: &[&str] = &[
    "    classDef agent fill:#E3F2FD,stroke:#1976D2",
    "    classDef tool fill:#FFF3E0,stroke:#F57C00",
    "    classDef llm fill:#F3E5F5,stroke:#7B1FA2",
    "    classDef input fill:#E8F5E9,stroke:#388E3C",
    "    classDef output fill:#FFEBEE,stroke:#D32F2F",
];

/// Export a graph as a Mermaid `flowchart TD` diagram
///
/// **Public** - node labels carry the duration when it is nonzero
///
/// # Example
/// ```ignore
/// let text = export_mermaid(&graph);
/// assert!(text.starts_with("flowchart TD"));
/// ```
pub fn export_mermaid(graph: &OrchestrationGraph) -> String {
    let mut lines = vec!["flowchart TD".to_string()];

    for node in graph.nodes() {
        let safe_name = mermaid_text(&node.name);
        let label = match node.duration_ms() {
            Some(ms) if ms != 0.0 => format!("{}<br/>{:.0}ms", safe_name, ms),
            _ => safe_name,
        };
        lines.push(format!(
            "    {}[\"{}\"]{}",
            mermaid_id(&node.id),
            label,
            class_suffix(node.node_type)
        ));
    }

    for edge in graph.edges() {
        let source = mermaid_id(&edge.source_id);
        let target = mermaid_id(&edge.target_id);
        match &edge.label {
            Some(label) => lines.push(format!(
                "    {} -->|{}| {}",
                source,
                mermaid_text(label),
                target
            )),
            None => lines.push(format!("    {} --> {}", source, target)),
        }
    }

    lines.push(String::new());
    lines.extend(CLASS_DEFINITIONS.iter().map(|line| line.to_string()));
    lines.join("\n")
}

/// Replace characters that close a Mermaid label early
fn mermaid_text(text: &str) -> String {
    text.replace('"', "'")
        .replace('[', "(")
        .replace(']', ")")
        .replace('|', "/")
}

/// Restrict an id to characters Mermaid accepts unquoted
fn mermaid_id(id: &str) -> String {
    let sanitized: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "node".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    #[test]
    fn test_basic_flowchart() {
        let mut graph = OrchestrationGraph::new("Test Graph");
        graph.add_node(Node::new("1", "Agent A", NodeType::Agent));
        graph.add_node(Node::new("2", "Tool B", NodeType::Tool));
        graph.add_edge(Edge::new("1", "2"));

        let text = export_mermaid(&graph);
        assert!(text.starts_with("flowchart TD"));
        assert!(text.contains("    1[\"Agent A\"]:::agent"));
        assert!(text.contains("    2[\"Tool B\"]:::tool"));
        assert!(text.contains("    1 --> 2"));
        assert!(text.contains("classDef agent"));
    }

    #[test]
    fn test_duration_label_and_escaping() {
        let mut graph = OrchestrationGraph::new("d");
        graph.add_node(
            Node::new("span-1", "say \"hi\" [x]", NodeType::Unknown)
                .with_times(Some(0.0), Some(0.5)),
        );
        graph.add_node(Node::new("b", "B", NodeType::Tool));
        graph.add_edge(Edge::new("span-1", "b").with_label("calls"));

        let text = export_mermaid(&graph);
        assert!(text.contains("    span_1[\"say 'hi' (x)<br/>500ms\"]\n"));
        assert!(text.contains("    span_1 -->|calls| b"));
    }

    #[test]
    fn test_edge_labels_are_escaped() {
        let mut graph = OrchestrationGraph::new("labels");
        graph.add_node(Node::new("a", "A", NodeType::Agent));
        graph.add_node(Node::new("b", "B", NodeType::Tool));
        graph.add_edge(Edge::new("a", "b").with_label("grep \"a|b\" [1]"));

        let text = export_mermaid(&graph);
        assert!(text.contains("    a -->|grep 'a/b' (1)| b"));
    }
}
