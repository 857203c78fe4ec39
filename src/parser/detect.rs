//! Trace format detection.
//!
//! Sniffs the shape of a parsed document and decides which dialect it is.
//! The rules form a fixed decision table: the first matching rule wins
//! and anything unrecognized falls back to OpenTelemetry.

use serde_json::{Map, Value};
use std::fmt;

/// Supported trace dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceFormat {
    /// OTLP JSON export (`spans` or `resourceSpans`)
    OpenTelemetry,
    /// LangChain / LangSmith style run trees (`runs`, `child_runs`)
    RunChain,
    /// CrewAI style crews (`crew_name`, `agents`, `tasks`, `execution_trace`)
    Crew,
    /// AutoGen style conversations (`agents`, `messages`)
    Conversation,
}

impl TraceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceFormat::OpenTelemetry => "opentelemetry",
            TraceFormat::RunChain => "run_chain",
            TraceFormat::Crew => "crew",
            TraceFormat::Conversation => "conversation",
        }
    }
}

impl fmt::Display for TraceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide which dialect a trace document uses
///
/// **Public** - total function, never fails
///
/// Priority order:
/// 1. `spans` / `resourceSpans` -> OpenTelemetry
/// 2. `runs` / `run_type` -> RunChain
/// 3. `crew_name` / `crew_id`, or `agents` with `tasks` -> Crew
/// 4. `messages` / `conversation`, or `agents` with `messages` -> Conversation
/// 5. anything else -> OpenTelemetry
pub fn detect_format(document: &Map<String, Value>) -> TraceFormat {
    let has = |key: &str| document.contains_key(key);

    if has("spans") || has("resourceSpans") {
        TraceFormat::OpenTelemetry
    } else if has("runs") || has("run_type") {
        TraceFormat::RunChain
    } else if has("crew_name") || has("crew_id") || (has("agents") && has("tasks")) {
        TraceFormat::Crew
    } else if has("messages") || has("conversation") || (has("agents") && has("messages")) {
        TraceFormat::Conversation
    } else {
        TraceFormat::OpenTelemetry
    }
}
