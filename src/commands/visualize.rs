//! Visualize command implementation.
//!
//! The visualize command:
//! 1. Parses the trace
//! 2. Renders it in the requested format
//! 3. Writes the output file

use super::models::{RenderFormat, VisualizeArgs};
use crate::output::{write_graph, write_text};
use crate::parser::parse_trace_file;
use crate::render::{export_dot, export_mermaid, generate_flamegraph, FlamegraphConfig};
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

/// Execute the visualize command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The path actually written, extension included
///
/// # Errors
/// * Trace parsing errors
/// * `RenderError::EmptyGraph` for a flamegraph of an untimed trace
/// * File write errors
pub fn execute_visualize(args: &VisualizeArgs) -> Result<PathBuf> {
    validate_args(args)?;

    info!("Step 1/3: Parsing trace file: {}", args.file.display());
    let graph = parse_trace_file(&args.file)
        .with_context(|| format!("Failed to parse trace {}", args.file.display()))?;

    let output = output_path(&args.output, args.format);
    info!("Step 2/3: Rendering {:?}...", args.format);

    match args.format {
        RenderFormat::Json => {
            info!("Step 3/3: Writing graph document...");
            write_graph(&graph, &output).context("Failed to write graph JSON")?;
        }
        RenderFormat::Mermaid => {
            let text = export_mermaid(&graph);
            info!("Step 3/3: Writing Mermaid diagram...");
            write_text(&text, &output).context("Failed to write Mermaid diagram")?;
        }
        RenderFormat::Dot => {
            let text = export_dot(&graph);
            info!("Step 3/3: Writing DOT diagram...");
            write_text(&text, &output).context("Failed to write DOT diagram")?;
        }
        RenderFormat::Flamegraph => {
            let title = args.title.clone().unwrap_or_else(|| graph.name.clone());
            let config = FlamegraphConfig::new().with_title(title).with_width(args.width);
            let svg = generate_flamegraph(&graph, &config)
                .context("Failed to generate flamegraph")?;
            info!("Step 3/3: Writing flamegraph...");
            write_text(&svg, &output).context("Failed to write flamegraph SVG")?;
        }
    }

    println!("✓ {:?} output saved to: {}", args.format, output.display());
    Ok(output)
}

/// Validate visualize arguments
///
/// **Public** - can be called before execute_visualize for early validation
pub fn validate_args(args: &VisualizeArgs) -> Result<()> {
    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }
    if args.format == RenderFormat::Flamegraph && args.width == 0 {
        anyhow::bail!("Flamegraph width must be greater than 0");
    }
    Ok(())
}

/// Append the format's extension unless the path already ends with it
///
/// Other dots are kept: `run.v2` becomes `run.v2.md`, not `run.md`.
pub fn output_path(path: &Path, format: RenderFormat) -> PathBuf {
    let suffix = format!(".{}", format.extension());
    if path.as_os_str().to_string_lossy().ends_with(&suffix) {
        return path.to_path_buf();
    }

    let mut with_suffix = path.as_os_str().to_os_string();
    with_suffix.push(&suffix);
    PathBuf::from(with_suffix)
}
