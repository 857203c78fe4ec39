//! Dissect
//!
//! Critical path analysis, diffing and visualization for multi-agent
//! workflow traces.
//!
//! Traces from OpenTelemetry, LangChain-style run trees, CrewAI-style
//! crews and AutoGen-style conversations are normalized into one
//! `OrchestrationGraph`, which the rest of the crate analyzes.
//!
//! This crate provides the core implementation for the `dissect` CLI tool.
//!
//! ## Getting Started
//!
//! ```ignore
//! use dissect_trace::parser::parse_trace_file;
//!
//! let graph = parse_trace_file("trace.json")?;
//! let path = graph.critical_path();
//! println!("{:.0}ms through {:?}", path.total_duration_ms, path.ids());
//! ```

pub mod commands;
pub mod diff;
pub mod graph;
pub mod output;
pub mod parser;
pub mod render;
pub mod utils;

pub use graph::{Edge, Node, NodeType, OrchestrationGraph};
pub use parser::{parse_trace, parse_trace_file, parse_trace_str};
