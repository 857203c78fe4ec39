//! Trace diff generation.
//!
//! This module compares two orchestration graphs (old vs new) and reports
//! added/removed nodes, duration regressions and improvements, and edge
//! changes. Matching is by node name so that runs with fresh ids compare.
//!
//! # Example
//! ```ignore
//! use dissect_trace::diff::{diff_graphs, format_diff};
//!
//! let diff = diff_graphs(&old, &new);
//! println!("{}", format_diff(&diff));
//! ```

mod engine;
mod output;
mod schema;

// Public API exports
pub use engine::{diff_graphs, percentage_change};
pub use output::format_diff;
pub use schema::{DiffStatus, EdgeDiff, EdgeStatus, NodeDiff, TraceDiff};
