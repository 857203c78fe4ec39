use clap::ValueEnum;
use std::path::PathBuf;

/// Output formats for the visualize command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    /// Graph document with durations and heat scores
    Json,
    /// Mermaid flowchart
    Mermaid,
    /// Graphviz digraph
    Dot,
    /// SVG flamegraph of node self time
    Flamegraph,
}

impl RenderFormat {
    /// File extension appended to output paths that do not already end with it
    pub fn extension(&self) -> &'static str {
        match self {
            RenderFormat::Json => "json",
            RenderFormat::Mermaid => "md",
            RenderFormat::Dot => "dot",
            RenderFormat::Flamegraph => "svg",
        }
    }
}

/// Arguments for the trace command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct TraceArgs {
    /// Trace file to parse
    pub file: PathBuf,

    /// Rows in the slowest-nodes table
    pub top_nodes: usize,
}

impl Default for TraceArgs {
    fn default() -> Self {
        Self {
            file: PathBuf::from("trace.json"),
            top_nodes: 10,
        }
    }
}

/// Arguments for the visualize command
#[derive(Debug, Clone)]
pub struct VisualizeArgs {
    /// Trace file to parse
    pub file: PathBuf,

    pub format: RenderFormat,

    /// Output path; the format's extension is appended unless already present
    pub output: PathBuf,

    /// Flamegraph title (defaults to the graph name)
    pub title: Option<String>,

    /// Flamegraph width in pixels
    pub width: usize,
}

impl Default for VisualizeArgs {
    fn default() -> Self {
        Self {
            file: PathBuf::from("trace.json"),
            format: RenderFormat::Mermaid,
            output: PathBuf::from("graph"),
            title: None,
            width: crate::utils::config::DEFAULT_FLAMEGRAPH_WIDTH,
        }
    }
}

/// Arguments for the diff command
#[derive(Debug, Clone, Default)]
pub struct DiffArgs {
    /// Baseline trace or graph document
    pub old: PathBuf,

    /// Trace or graph document to compare
    pub new: PathBuf,

    /// Optional JSON report path
    pub output: Option<PathBuf>,

    /// Fail when any node regresses by more than this percentage
    pub max_regression_pct: Option<f64>,
}
