//! Configuration and constants for the library and CLI.

/// Current output schema version for graph and diff documents
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default name for a graph constructed without one
pub const DEFAULT_GRAPH_NAME: &str = "Workflow";

// Default trace names per dialect, used when the document carries none
pub const DEFAULT_OTEL_NAME: &str = "Trace";
pub const DEFAULT_RUN_CHAIN_NAME: &str = "LangChain Trace";
pub const DEFAULT_CREW_NAME: &str = "CrewAI Trace";
pub const DEFAULT_CONVERSATION_NAME: &str = "AutoGen Conversation";

/// Duration change (ms) a matched node must exceed to count as changed
pub const DURATION_EPSILON_MS: f64 = 0.01;

/// Numeric timestamps above this are presumed to be epoch milliseconds
pub const MILLISECOND_EPOCH_THRESHOLD: f64 = 1e10;

/// OTLP timestamps are nanoseconds since the epoch
pub const NANOS_PER_SECOND: f64 = 1e9;

// Label truncation for synthesized node names
pub const TASK_NAME_MAX_CHARS: usize = 60;
pub const MESSAGE_PREVIEW_MAX_CHARS: usize = 40;

/// Default flamegraph width in pixels
pub const DEFAULT_FLAMEGRAPH_WIDTH: usize = 1200;
