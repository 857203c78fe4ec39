use dissect_trace::graph::NodeType;
use dissect_trace::parser::{detect_format, parse_trace, parse_trace_file, TraceFormat};
use dissect_trace::utils::error::ParseError;
use serde_json::json;
use std::io::Write;

#[test]
fn test_opentelemetry_simple_spans() {
    let graph = parse_trace(&json!({
        "spans": [
            {
                "spanId": "s1",
                "name": "langchain.agent",
                "startTimeUnixNano": "1000000000",
                "endTimeUnixNano": "2000000000",
                "attributes": []
            },
            {"spanId": "s2", "name": "tool_call", "parentSpanId": "s1", "attributes": []}
        ]
    }))
    .unwrap();

    assert_eq!(graph.name, "Trace");
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    let s1 = graph.node("s1").unwrap();
    assert_eq!(s1.start_time, Some(1.0));
    assert_eq!(s1.end_time, Some(2.0));
    assert_eq!(s1.node_type, NodeType::Agent);
    assert_eq!(graph.edges()[0].label.as_deref(), Some("tool_call"));
}

#[test]
fn test_opentelemetry_full_otlp_structure() {
    let graph = parse_trace(&json!({
        "resourceSpans": [{"scopeSpans": [{"spans": [{"spanId": "a", "name": "root", "attributes": []}]}]}]
    }))
    .unwrap();
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn test_opentelemetry_orphan_parent_becomes_root() {
    let graph = parse_trace(&json!({
        "spans": [{"spanId": "c", "name": "child", "parentSpanId": "missing"}]
    }))
    .unwrap();
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.root_nodes().len(), 1);
}

#[test]
fn test_opentelemetry_span_types_by_name() {
    let graph = parse_trace(&json!({
        "spans": [
            {"spanId": "s1", "name": "langchain.agent.run", "attributes": []},
            {"spanId": "s2", "name": "openai.chat.completion", "attributes": []},
            {"name": "anonymous"}
        ]
    }))
    .unwrap();
    assert_eq!(graph.node("s1").unwrap().node_type, NodeType::Agent);
    assert_eq!(graph.node("s2").unwrap().node_type, NodeType::LlmCall);
    assert_eq!(graph.node("span_2").unwrap().node_type, NodeType::Unknown);
}

#[test]
fn test_run_chain_with_child_runs() {
    let graph = parse_trace(&json!({
        "name": "LC Trace",
        "runs": [{
            "id": "r1",
            "name": "AgentExecutor",
            "run_type": "agent",
            "start_time": 1000000000.0,
            "end_time": 1000001000.0,
            "child_runs": [{"id": "r2", "name": "search_tool", "run_type": "tool", "child_runs": []}]
        }]
    }))
    .unwrap();

    assert_eq!(graph.name, "LC Trace");
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.node("r1").unwrap().node_type, NodeType::Agent);
    assert_eq!(graph.node("r2").unwrap().node_type, NodeType::Tool);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_crew_execution_trace() {
    let graph = parse_trace(&json!({
        "crew_name": "Test Crew",
        "crew_id": "crew-1",
        "agents": [],
        "tasks": [],
        "execution_trace": [
            {"step_id": "step-1", "type": "agent_execution", "name": "Research Step",
             "start_time": 1000.0, "end_time": 1005.0},
            {"step_id": "step-2", "type": "tool_call", "name": "Web Search"}
        ]
    }))
    .unwrap();

    assert_eq!(graph.name, "Test Crew");
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.node("step-1").unwrap().node_type, NodeType::Agent);
    assert_eq!(graph.node("step-1").unwrap().duration_ms(), Some(5000.0));
    assert_eq!(graph.node("step-2").unwrap().node_type, NodeType::Tool);
}

#[test]
fn test_crew_agent_tool_calls() {
    let graph = parse_trace(&json!({
        "crew_name": "Tool Crew",
        "crew_id": "crew-2",
        "agents": [{
            "agent_id": "a1",
            "role": "Researcher",
            "tool_calls": [
                {"tool_id": "t1", "tool_name": "web_search"},
                {"tool_id": "t2", "tool_name": "calculator"}
            ]
        }],
        "tasks": []
    }))
    .unwrap();

    assert_eq!(graph.node_count(), 4);
    let t1 = graph.node("t1").unwrap();
    assert_eq!(t1.node_type, NodeType::Tool);
    assert_eq!(t1.name, "web_search");
    assert_eq!(graph.parents("t1")[0].id, "a1");
    assert_eq!(graph.parents("a1")[0].id, "crew-2");
}

#[test]
fn test_crew_tasks() {
    let graph = parse_trace(&json!({
        "crew_name": "Task Crew",
        "crew_id": "crew-3",
        "agents": [],
        "tasks": [
            {"task_id": "task-1", "description": "Research AI trends"},
            {"task_id": "task-2", "description": "Write summary report"}
        ]
    }))
    .unwrap();

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.node("task-1").unwrap().name, "Research AI trends");
}

#[test]
fn test_conversation_messages() {
    let graph = parse_trace(&json!({
        "name": "AG Chat",
        "agents": [
            {"name": "UserProxy", "type": "user_proxy"},
            {"name": "Assistant", "type": "assistant"}
        ],
        "messages": [
            {"message_id": "m1", "sender": "UserProxy", "content": "Hello", "role": "user"},
            {"message_id": "m2", "sender": "Assistant", "content": "Hi there", "role": "assistant"}
        ]
    }))
    .unwrap();

    assert_eq!(graph.name, "AG Chat");
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.node("UserProxy").unwrap().node_type, NodeType::UserInput);
    assert_eq!(graph.node("m1").unwrap().name, "UserProxy: Hello");
    assert_eq!(graph.parents("m1")[0].id, "UserProxy");
    assert_eq!(graph.parents("m2")[0].id, "m1");
}

#[test]
fn test_conversation_function_calls() {
    let graph = parse_trace(&json!({
        "name": "FC Chat",
        "agents": [],
        "messages": [{
            "message_id": "m1",
            "sender": "Agent",
            "content": "Calling tool",
            "function_calls": [{"id": "fc1", "name": "search", "arguments": "{\"q\": \"test\"}"}]
        }]
    }))
    .unwrap();

    assert_eq!(graph.node_count(), 2);
    let call = graph.node("fc1").unwrap();
    assert_eq!(call.node_type, NodeType::Tool);
    assert_eq!(call.name, "search");
}

#[test]
fn test_conversation_tool_calls_key() {
    let graph = parse_trace(&json!({
        "name": "TC Chat",
        "agents": [],
        "messages": [{
            "message_id": "m1",
            "sender": "Agent",
            "content": "Using tool",
            "tool_calls": [{"id": "tc1", "function": {"name": "calc", "arguments": "{}"}}]
        }]
    }))
    .unwrap();

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.node("tc1").unwrap().name, "calc");
}

#[test]
fn test_detection_priority() {
    let doc = json!({"spans": [], "messages": [{"sender": "A"}]});
    assert_eq!(detect_format(doc.as_object().unwrap()), TraceFormat::OpenTelemetry);

    let graph = parse_trace(&doc).unwrap();
    assert!(graph.is_empty());
    assert_eq!(graph.metadata["source_format"], json!("opentelemetry"));
}

#[test]
fn test_unknown_document_falls_back_to_opentelemetry() {
    let graph = parse_trace(&json!({"unknown_format": true})).unwrap();
    assert!(graph.is_empty());
    assert_eq!(graph.name, "Trace");
}

#[test]
fn test_non_object_documents_rejected() {
    for doc in [json!([]), json!("text"), json!(null), json!(42)] {
        assert!(matches!(parse_trace(&doc), Err(ParseError::InvalidFormat(_))));
    }
}

#[test]
fn test_parse_trace_file_detects_each_dialect() {
    let cases = [
        (json!({"spans": [{"spanId": "s1", "name": "test", "attributes": []}]}), "opentelemetry"),
        (json!({"runs": [{"id": "r1", "name": "chain", "run_type": "chain", "child_runs": []}]}), "run_chain"),
        (json!({"crew_name": "Test", "agents": [], "tasks": []}), "crew"),
        (json!({"messages": [{"message_id": "m1", "sender": "A", "content": "hi"}]}), "conversation"),
    ];

    for (doc, expected) in cases {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", doc).unwrap();

        let graph = parse_trace_file(file.path()).unwrap();
        assert_eq!(graph.metadata["source_format"], json!(expected));
        assert!(!graph.is_empty());
    }
}

#[test]
fn test_parse_trace_file_missing() {
    let result = parse_trace_file("/definitely/not/here.json");
    assert!(matches!(result, Err(ParseError::Io(_))));
}

#[test]
fn test_malformed_records_degrade_instead_of_dropping() {
    let graph = parse_trace(&json!({
        "runs": [{
            "id": "r1",
            "name": "fetch",
            "run_type": "retriever",
            "start_time": "not a date",
            "end_time": 1000.5,
            "child_runs": []
        }]
    }))
    .unwrap();

    let run = graph.node("r1").unwrap();
    assert_eq!(run.node_type, NodeType::Unknown);
    assert_eq!(run.start_time, None);
    assert_eq!(run.end_time, Some(1000.5));
    assert_eq!(run.duration_ms(), None);

    let graph = parse_trace(&json!({
        "spans": [{"spanId": "s1", "name": "step", "startTimeUnixNano": "soon", "endTimeUnixNano": {}}]
    }))
    .unwrap();

    let span = graph.node("s1").unwrap();
    assert_eq!(span.node_type, NodeType::Unknown);
    assert_eq!(span.start_time, None);
    assert_eq!(span.end_time, None);
}
