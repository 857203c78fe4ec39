//! Flamegraph generation using the inferno library.
//!
//! Each node becomes a collapsed stack: the names along its first-parent
//! chain from a root, weighted by the node's self time in microseconds.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "Planner;Researcher;web_search 1500"
//! This means web_search ran for 1.5 ms beneath Researcher, which ran
//! beneath Planner.

use crate::graph::{Node, OrchestrationGraph};
use crate::utils::config::DEFAULT_FLAMEGRAPH_WIDTH;
use crate::utils::error::RenderError;
use inferno::flamegraph::{self, Options};
use log::{debug, info};
use std::collections::{BTreeMap, HashSet};

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Frame names joined with `;`, root first
    pub stack: String,

    /// Self time in microseconds
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Line in the collapsed-stack text format
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Workflow Flamegraph".to_string(),
            width: DEFAULT_FLAMEGRAPH_WIDTH,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Build collapsed stacks from a graph
///
/// **Public** - input for generate_flamegraph
///
/// # Algorithm
/// 1. Self time = node duration minus the durations of its children,
///    floored at zero, in whole microseconds
/// 2. Stack = names along the first-parent chain, root first; a chain
///    that revisits a node stops there
/// 3. Identical stacks are merged by summing weights
/// 4. Zero-weight stacks are dropped; the rest are sorted by stack
pub fn build_collapsed_stacks(graph: &OrchestrationGraph) -> Vec<CollapsedStack> {
    let mut merged: BTreeMap<String, u64> = BTreeMap::new();

    for node in graph.nodes() {
        let weight = self_time_us(graph, node);
        if weight == 0 {
            continue;
        }
        *merged.entry(stack_for(graph, node)).or_insert(0) += weight;
    }

    debug!("Built {} collapsed stacks", merged.len());
    merged
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect()
}

/// Render a graph as an SVG flamegraph
///
/// # Errors
/// * `RenderError::EmptyGraph` - No node has positive self time
/// * `RenderError::SvgFailed` - inferno rejected the stacks or wrote invalid UTF-8
pub fn generate_flamegraph(
    graph: &OrchestrationGraph,
    config: &FlamegraphConfig,
) -> Result<String, RenderError> {
    let stacks = build_collapsed_stacks(graph);
    if stacks.is_empty() {
        return Err(RenderError::EmptyGraph);
    }

    info!("Generating flamegraph with {} stacks", stacks.len());

    let lines: Vec<String> = stacks.iter().map(CollapsedStack::to_line).collect();

    let mut options = Options::default();
    options.title = config.title.clone();
    options.count_name = "μs".to_string();
    options.image_width = Some(config.width);

    let mut svg = Vec::new();
    flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| RenderError::SvgFailed(e.to_string()))?;

    let svg = String::from_utf8(svg).map_err(|e| RenderError::SvgFailed(e.to_string()))?;

    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

/// Self time of a node in microseconds
fn self_time_us(graph: &OrchestrationGraph, node: &Node) -> u64 {
    let Some(duration) = node.duration_ms() else {
        return 0;
    };
    let children: f64 = graph
        .children(&node.id)
        .into_iter()
        .filter_map(Node::duration_ms)
        .sum();
    let self_ms = (duration - children).max(0.0);
    (self_ms * 1000.0).round() as u64
}

/// Frame names from the root down to `node`
fn stack_for(graph: &OrchestrationGraph, node: &Node) -> String {
    let mut frames = vec![frame_name(&node.name)];
    let mut visited: HashSet<&str> = HashSet::from([node.id.as_str()]);

    let mut current = node;
    while let Some(parent) = graph.parents(&current.id).into_iter().next() {
        if !visited.insert(parent.id.as_str()) {
            break;
        }
        frames.push(frame_name(&parent.name));
        current = parent;
    }

    frames.reverse();
    frames.join(";")
}

/// `;` separates frames in the collapsed format
fn frame_name(name: &str) -> String {
    if name.is_empty() {
        "unnamed".to_string()
    } else {
        name.replace(';', ":")
    }
}
