//! Trace command implementation.
//!
//! Parses a trace file and prints a summary: counts, roots, the critical
//! path and the slowest nodes.

use super::models::TraceArgs;
use crate::graph::OrchestrationGraph;
use crate::parser::parse_trace_file;
use crate::render::trace_summary;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the trace command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The parsed graph, after its summary has been printed
///
/// # Errors
/// * File read failures
/// * Documents that are not JSON objects
pub fn execute_trace(args: &TraceArgs) -> Result<OrchestrationGraph> {
    let start_time = Instant::now();
    info!("Parsing trace file: {}", args.file.display());

    let graph = parse_trace_file(&args.file)
        .with_context(|| format!("Failed to parse trace {}", args.file.display()))?;

    debug!("Critical path: {:?}", graph.critical_path().ids());

    println!("{}", trace_summary(&graph, args.top_nodes));

    info!("Trace analyzed in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(graph)
}
