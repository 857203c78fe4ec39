//! JSON output writer for graphs and diffs.
//!
//! Writes graph documents and diff reports with pretty formatting.

use super::{calculate_file_size, prepare_output_path};
use crate::diff::TraceDiff;
use crate::graph::{GraphDocument, OrchestrationGraph};
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write a graph document to a JSON file
///
/// **Public** - main entry point for graph output
///
/// # Arguments
/// * `graph` - Graph to serialize (heat scores and durations included)
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let graph = parse_trace_file("trace.json")?;
/// write_graph(&graph, "graph.json")?;
/// ```
pub fn write_graph(
    graph: &OrchestrationGraph,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing graph to: {}", output_path.display());
    write_pretty(&graph.to_document(), output_path)?;
    info!(
        "Graph written successfully ({} bytes)",
        calculate_file_size(output_path)
    );
    Ok(())
}

/// Write a diff report to a JSON file
///
/// # Errors
/// Same as `write_graph`
pub fn write_diff(diff: &TraceDiff, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing diff report to: {}", output_path.display());
    write_pretty(diff, output_path)?;
    info!(
        "Diff written successfully ({} bytes)",
        calculate_file_size(output_path)
    );
    Ok(())
}

/// Read a graph document from a JSON file
///
/// **Public** - inverse of `write_graph`
///
/// # Errors
/// * `OutputError::ReadFailed` - File missing or unreadable
/// * `OutputError::SerializationFailed` - Not a graph document
pub fn read_graph(input_path: impl AsRef<Path>) -> Result<OrchestrationGraph, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading graph from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::ReadFailed)?;
    let document: GraphDocument = serde_json::from_reader(BufReader::new(file))?;
    Ok(OrchestrationGraph::from_document(document))
}

fn write_pretty<T: Serialize>(value: &T, output_path: &Path) -> Result<(), OutputError> {
    prepare_output_path(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
