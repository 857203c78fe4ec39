//! Graph renderers.
//!
//! Converts an orchestration graph into diagram text (Mermaid, DOT),
//! an SVG flamegraph via inferno, or a terminal summary.

pub mod dot;
pub mod flamegraph;
pub mod mermaid;
pub mod summary;

// Re-export main types
pub use dot::export_dot;
pub use flamegraph::{build_collapsed_stacks, generate_flamegraph, CollapsedStack, FlamegraphConfig};
pub use mermaid::export_mermaid;
pub use summary::trace_summary;
