//! Conversation normalizer for AutoGen style multi-agent chats.
//!
//! Messages form a chain in the order they were sent. Function / tool
//! calls attached to a message hang off that message.

use super::fields::{array_field, copy_fields, id_field, lookup, str_field, truncate_chars};
use super::timestamp::parse_timestamp;
use super::Normalizer;
use crate::graph::{Edge, Metadata, Node, NodeType, OrchestrationGraph};
use crate::utils::config::{DEFAULT_CONVERSATION_NAME, MESSAGE_PREVIEW_MAX_CHARS};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Message `role` -> node type
const ROLE_TYPES: &[(&str, NodeType)] = &[
    ("user", NodeType::UserInput),
    ("assistant", NodeType::Agent),
    ("function", NodeType::Tool),
    ("tool", NodeType::Tool),
    ("system", NodeType::Unknown),
];

const MESSAGE_METADATA_KEYS: &[&str] = &["sender", "role", "content"];

/// Normalizer for conversation documents
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversationNormalizer;

impl Normalizer for ConversationNormalizer {
    fn normalize(&self, document: &Map<String, Value>) -> OrchestrationGraph {
        let name = str_field(document, &["name"]).unwrap_or(DEFAULT_CONVERSATION_NAME);
        let mut graph = OrchestrationGraph::new(name);

        let mut agents = HashSet::new();
        for agent in array_field(document, &["agents"]) {
            let Some(agent) = agent.as_object() else {
                warn!("Skipping agent: not a JSON object");
                continue;
            };
            let Some(agent_name) = str_field(agent, &["name"]) else {
                warn!("Skipping agent without a name");
                continue;
            };
            let node_type = match str_field(agent, &["type"]) {
                Some("user_proxy") => NodeType::UserInput,
                _ => NodeType::Agent,
            };
            graph.add_node(
                Node::new(agent_name, agent_name, node_type)
                    .with_metadata(copy_fields(agent, &["type", "system_message"])),
            );
            agents.insert(agent_name.to_string());
        }

        let mut previous: Option<String> = None;
        for message in array_field(document, &["messages", "conversation"]) {
            let Some(message) = message.as_object() else {
                warn!("Skipping message: not a JSON object");
                continue;
            };

            let message_id = add_message(&mut graph, message);
            match previous.take() {
                Some(previous_id) => {
                    graph.add_edge(Edge::new(previous_id, message_id.clone()).with_label("next"));
                }
                None => {
                    if let Some(sender) = str_field(message, &["sender"]) {
                        if agents.contains(sender) {
                            graph.add_edge(
                                Edge::new(sender, message_id.clone()).with_label("sends"),
                            );
                        }
                    }
                }
            }

            add_calls(&mut graph, &message_id, message);
            previous = Some(message_id);
        }

        debug!(
            "Conversation '{}' produced {} nodes and {} edges",
            graph.name,
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }
}

/// Convert one message into a node and return its id
fn add_message(graph: &mut OrchestrationGraph, message: &Map<String, Value>) -> String {
    let id = id_field(message, &["message_id", "id"]).unwrap_or_else(|| graph.synthetic_id("msg"));
    let sender = str_field(message, &["sender"]).unwrap_or("unknown");

    let name = match str_field(message, &["content"]) {
        Some(content) => format!(
            "{}: {}",
            sender,
            truncate_chars(content, MESSAGE_PREVIEW_MAX_CHARS)
        ),
        None => sender.to_string(),
    };

    let node_type = match str_field(message, &["role"]) {
        Some(role) => lookup(ROLE_TYPES, role).unwrap_or(NodeType::Unknown),
        None => NodeType::Agent,
    };

    let start_time = ["timestamp", "start_time"]
        .iter()
        .find_map(|key| message.get(*key))
        .and_then(parse_timestamp);
    let end_time = message.get("end_time").and_then(parse_timestamp);

    graph.add_node(
        Node::new(id.clone(), name, node_type)
            .with_times(start_time, end_time)
            .with_metadata(copy_fields(message, MESSAGE_METADATA_KEYS)),
    );
    id
}

/// Attach `function_calls` / `tool_calls` of a message as tool nodes
///
/// **Private** - accepts both `{name, arguments}` and the
/// `{function: {name, arguments}}` wrapping
fn add_calls(graph: &mut OrchestrationGraph, message_id: &str, message: &Map<String, Value>) {
    for call in array_field(message, &["function_calls", "tool_calls"]) {
        let Some(call) = call.as_object() else {
            warn!("Skipping call on message {}: not a JSON object", message_id);
            continue;
        };

        let function = call
            .get("function")
            .and_then(Value::as_object)
            .unwrap_or(call);
        let id = id_field(call, &["id"]).unwrap_or_else(|| graph.synthetic_id("call"));
        let name = str_field(function, &["name"]).unwrap_or("function");

        let mut metadata = Metadata::new();
        if let Some(arguments) = function.get("arguments").or_else(|| call.get("arguments")) {
            metadata.insert("arguments".to_string(), arguments.clone());
        }

        graph.add_node(Node::new(id.clone(), name, NodeType::Tool).with_metadata(metadata));
        graph.add_edge(Edge::new(message_id, id).with_label("calls"));
    }
}
