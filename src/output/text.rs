//! Text output writer.
//!
//! Writes rendered diagrams (Mermaid, DOT) and SVG flamegraphs.

use super::prepare_output_path;
use crate::utils::error::OutputError;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write rendered text content to a file
///
/// **Public** - shared by every non-JSON `visualize` format
///
/// # Arguments
/// * `content` - Rendered diagram or SVG
/// * `output_path` - Destination file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
///
/// # Example
/// ```ignore
/// let svg = generate_flamegraph(&graph, &FlamegraphConfig::default())?;
/// write_text(&svg, "flamegraph.svg")?;
/// ```
pub fn write_text(content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing output to: {}", output_path.display());

    prepare_output_path(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;

    let file_size = content.len();
    info!(
        "Output written successfully ({} bytes, {:.2} KB)",
        file_size,
        file_size as f64 / 1024.0
    );
    Ok(())
}
