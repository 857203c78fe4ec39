//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod diff;
pub mod models;
pub mod trace;
pub mod utils;
pub mod visualize;

// Re-export main command functions
pub use diff::{check_regression_budget, execute_diff};
pub use models::{DiffArgs, RenderFormat, TraceArgs, VisualizeArgs};
pub use trace::execute_trace;
pub use utils::{display_schema, display_version, load_graph};
pub use visualize::{execute_visualize, validate_args};
