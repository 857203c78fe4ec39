//! Crew trace normalizer.
//!
//! A crew document declares agents and tasks up front and may carry an
//! `execution_trace` of steps. Everything hangs off a synthetic crew root
//! node unless a step names a more specific parent.

use super::fields::{array_field, copy_fields, id_field, lookup, str_field, truncate_chars};
use super::timestamp::parse_timestamp;
use super::Normalizer;
use crate::graph::{Edge, Node, NodeType, OrchestrationGraph};
use crate::utils::config::{DEFAULT_CREW_NAME, TASK_NAME_MAX_CHARS};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Execution step `type` -> node type
const STEP_TYPES: &[(&str, NodeType)] = &[
    ("agent_execution", NodeType::Agent),
    ("task_execution", NodeType::Agent),
    ("agent_action", NodeType::Agent),
    ("tool_call", NodeType::Tool),
    ("tool_usage", NodeType::Tool),
    ("llm_call", NodeType::LlmCall),
    ("user_input", NodeType::UserInput),
    ("human_input", NodeType::UserInput),
    ("output", NodeType::Output),
    ("final_output", NodeType::Output),
    ("final_answer", NodeType::Output),
];

const AGENT_METADATA_KEYS: &[&str] = &["goal", "backstory", "llm"];
const TOOL_METADATA_KEYS: &[&str] = &["input", "output"];
const TASK_METADATA_KEYS: &[&str] = &["description", "expected_output", "output", "status"];
const STEP_METADATA_KEYS: &[&str] = &["type", "agent_id", "input", "output", "status"];

/// Normalizer for crew documents
#[derive(Debug, Clone, Copy, Default)]
pub struct CrewNormalizer;

/// Mutable state threaded through one normalization
struct CrewBuilder {
    graph: OrchestrationGraph,
    crew_id: String,
    agent_ids: HashSet<String>,
}

impl Normalizer for CrewNormalizer {
    fn normalize(&self, document: &Map<String, Value>) -> OrchestrationGraph {
        let name = str_field(document, &["crew_name", "name"]).unwrap_or(DEFAULT_CREW_NAME);
        let mut builder = CrewBuilder::new(name, document);

        for agent in objects(array_field(document, &["agents"]), "agent") {
            builder.add_agent(agent);
        }
        for task in objects(array_field(document, &["tasks"]), "task") {
            builder.add_task(task);
        }
        builder.add_execution_trace(array_field(document, &["execution_trace"]));

        debug!(
            "Crew '{}' produced {} nodes and {} edges",
            builder.graph.name,
            builder.graph.node_count(),
            builder.graph.edge_count()
        );
        builder.graph
    }
}

impl CrewBuilder {
    fn new(name: &str, document: &Map<String, Value>) -> Self {
        let mut graph = OrchestrationGraph::new(name);
        let crew_id = id_field(document, &["crew_id"]).unwrap_or_else(|| graph.synthetic_id("crew"));

        let crew = Node::new(crew_id.clone(), name, NodeType::Agent)
            .with_metadata(copy_fields(document, &["process", "description"]));
        graph.add_node(crew);

        Self {
            graph,
            crew_id,
            agent_ids: HashSet::new(),
        }
    }

    fn add_agent(&mut self, agent: &Map<String, Value>) {
        let id = id_field(agent, &["agent_id", "id"]).unwrap_or_else(|| self.graph.synthetic_id("agent"));
        let name = str_field(agent, &["role", "name"]).unwrap_or("Agent");

        let node = Node::new(id.clone(), name, NodeType::Agent)
            .with_metadata(copy_fields(agent, AGENT_METADATA_KEYS));
        self.graph.add_node(node);
        self.graph.add_edge(Edge::new(self.crew_id.clone(), id.clone()));
        self.agent_ids.insert(id.clone());

        for tool_call in objects(array_field(agent, &["tool_calls"]), "tool call") {
            self.add_tool_call(&id, tool_call);
        }
    }

    fn add_tool_call(&mut self, parent_id: &str, tool_call: &Map<String, Value>) {
        let id = id_field(tool_call, &["tool_id", "id"]).unwrap_or_else(|| self.graph.synthetic_id("tool"));
        let name = str_field(tool_call, &["tool_name", "name"]).unwrap_or("tool");

        let node = Node::new(id.clone(), name, NodeType::Tool)
            .with_times(
                tool_call.get("start_time").and_then(parse_timestamp),
                tool_call.get("end_time").and_then(parse_timestamp),
            )
            .with_metadata(copy_fields(tool_call, TOOL_METADATA_KEYS));
        self.graph.add_node(node);
        self.graph.add_edge(Edge::new(parent_id, id));
    }

    fn add_task(&mut self, task: &Map<String, Value>) {
        let id = id_field(task, &["task_id", "id"]).unwrap_or_else(|| self.graph.synthetic_id("task"));
        let name = match str_field(task, &["name"]) {
            Some(name) => name.to_string(),
            None => str_field(task, &["description"])
                .map(|description| truncate_chars(description, TASK_NAME_MAX_CHARS))
                .unwrap_or_else(|| "Task".to_string()),
        };

        let node = Node::new(id.clone(), name, NodeType::Agent)
            .with_times(
                task.get("start_time").and_then(parse_timestamp),
                task.get("end_time").and_then(parse_timestamp),
            )
            .with_metadata(copy_fields(task, TASK_METADATA_KEYS));
        self.graph.add_node(node);
        self.graph.add_edge(Edge::new(self.crew_id.clone(), id.clone()));

        if let Some(agent_id) = id_field(task, &["agent_id"]) {
            if self.agent_ids.contains(&agent_id) {
                self.graph
                    .add_edge(Edge::new(agent_id, id).with_label("performs"));
            } else {
                debug!("Task {} references undeclared agent {}", id, agent_id);
            }
        }
    }

    /// Walk the execution trace, nested sub-steps included
    ///
    /// **Private** - explicit stack, children popped in document order
    fn add_execution_trace(&mut self, steps: &[Value]) {
        // (enclosing step id, step)
        let mut stack: Vec<(Option<String>, &Map<String, Value>)> = objects(steps, "step")
            .rev()
            .map(|step| (None, step))
            .collect();

        while let Some((enclosing, step)) = stack.pop() {
            let step_id = self.add_step(enclosing.as_deref(), step);

            for tool_call in objects(array_field(step, &["tool_calls"]), "tool call") {
                self.add_tool_call(&step_id, tool_call);
            }
            for sub_step in objects(array_field(step, &["sub_steps"]), "sub-step").rev() {
                stack.push((Some(step_id.clone()), sub_step));
            }
        }
    }

    fn add_step(&mut self, enclosing: Option<&str>, step: &Map<String, Value>) -> String {
        let id = id_field(step, &["step_id", "id"]).unwrap_or_else(|| self.graph.synthetic_id("step"));
        let step_type = str_field(step, &["type"]);
        let name = str_field(step, &["name"]).or(step_type).unwrap_or("step");
        let node_type = step_type
            .and_then(|kind| lookup(STEP_TYPES, kind))
            .unwrap_or(NodeType::Unknown);

        let node = Node::new(id.clone(), name, node_type)
            .with_times(
                step.get("start_time").and_then(parse_timestamp),
                step.get("end_time").and_then(parse_timestamp),
            )
            .with_metadata(copy_fields(step, STEP_METADATA_KEYS));

        let parent_id = self.step_parent(enclosing, step);
        self.graph.add_node(node);
        self.graph.add_edge(Edge::new(parent_id, id.clone()));
        id
    }

    /// Explicit parent, then the enclosing step, then a known agent, then the crew
    fn step_parent(&self, enclosing: Option<&str>, step: &Map<String, Value>) -> String {
        if let Some(parent_id) = id_field(step, &["parent_id", "parent_step_id"]) {
            return parent_id;
        }
        if let Some(enclosing) = enclosing {
            return enclosing.to_string();
        }
        id_field(step, &["agent_id"])
            .filter(|agent_id| self.graph.contains_node(agent_id))
            .unwrap_or_else(|| self.crew_id.clone())
    }
}

/// Object entries of `values`, logging and skipping anything else
fn objects<'a>(
    values: &'a [Value],
    what: &'static str,
) -> impl DoubleEndedIterator<Item = &'a Map<String, Value>> + 'a {
    values.iter().filter_map(move |value| {
        let object = value.as_object();
        if object.is_none() {
            warn!("Skipping {}: not a JSON object", what);
        }
        object
    })
}
