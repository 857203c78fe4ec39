//! Dissect CLI
//!
//! Parses multi-agent workflow traces, finds their critical path,
//! renders them as diagrams and flamegraphs, and diffs two runs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use dissect_trace::commands::{
    display_schema, display_version, execute_diff, execute_trace, execute_visualize, DiffArgs,
    RenderFormat, TraceArgs, VisualizeArgs,
};
use dissect_trace::utils::config::DEFAULT_FLAMEGRAPH_WIDTH;

/// Dissect - critical path analysis for multi-agent workflows
#[derive(Parser, Debug)]
#[command(name = "dissect")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a trace and print its summary and critical path
    Trace {
        /// Trace file (OpenTelemetry, LangChain, CrewAI or AutoGen JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Rows in the slowest-nodes table
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Render a trace as a diagram, flamegraph or graph document
    Visualize {
        /// Trace file to render
        #[arg(short, long)]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, env = "DISSECT_FORMAT", default_value = "mermaid")]
        format: RenderFormat,

        /// Output path (the format extension is appended unless already present)
        #[arg(short, long, env = "DISSECT_OUTPUT", default_value = "graph")]
        output: PathBuf,

        /// Flamegraph title (defaults to the trace name)
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value_t = DEFAULT_FLAMEGRAPH_WIDTH)]
        width: usize,
    },

    /// Compare two traces and report regressions
    Diff {
        /// Baseline trace or graph document
        #[arg(long)]
        old: PathBuf,

        /// Trace or graph document to compare
        #[arg(long)]
        new: PathBuf,

        /// Write the JSON diff report here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail if any node regresses by more than this percentage
        #[arg(long)]
        max_regression_pct: Option<f64>,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Trace { file, top } => {
            execute_trace(&TraceArgs {
                file,
                top_nodes: top,
            })?;
        }

        Commands::Visualize {
            file,
            format,
            output,
            title,
            width,
        } => {
            execute_visualize(&VisualizeArgs {
                file,
                format,
                output,
                title,
                width,
            })?;
        }

        Commands::Diff {
            old,
            new,
            output,
            max_regression_pct,
        } => {
            execute_diff(&DiffArgs {
                old,
                new,
                output,
                max_regression_pct,
            })?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
