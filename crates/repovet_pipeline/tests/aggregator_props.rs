//! Property tests for the aggregator: total on arbitrary histories,
//! deterministic, idempotent.

use proptest::prelude::*;
use repovet_core::message::{Message, ToolCall};
use repovet_pipeline::summarize;
use serde_json::Map;

fn tool_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("clone_repository".to_string()),
        Just("run_semgrep_scan".to_string()),
        Just("dependency_audit".to_string()),
    ]
}

/// Any printable payload, including things that are almost-JSON.
fn payload() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~]{0,300}",
        Just(r#"{"results":[]}"#.to_string()),
        Just(r#"{"error":"boom"}"#.to_string()),
        Just(r#"{"results": 42}"#.to_string()),
        Just("{truncated".to_string()),
    ]
}

prop_compose! {
    fn exchange()(name in tool_name(), payload in payload(), idx in 0u32..1000) -> Vec<Message> {
        let id = format!("call-{idx}");
        vec![
            Message::agent_with_calls("", vec![ToolCall {
                id: id.clone(),
                name,
                args: Map::new(),
            }]),
            Message::tool_result(id, payload),
        ]
    }
}

fn history() -> impl Strategy<Value = Vec<Message>> {
    (prop::collection::vec(exchange(), 0..6), any::<bool>()).prop_map(
        |(exchanges, with_narrative)| {
            let mut h = vec![Message::user("audit")];
            for ex in exchanges {
                h.extend(ex);
            }
            if with_narrative {
                h.push(Message::agent("done"));
            }
            h
        },
    )
}

proptest! {
    #[test]
    fn summarize_never_panics(h in history()) {
        let _ = summarize(&h, "https://example.com/r.git");
    }

    #[test]
    fn summarize_is_idempotent(h in history()) {
        let a = summarize(&h, "https://example.com/r.git");
        let b = summarize(&h, "https://example.com/r.git");
        prop_assert_eq!(a, b);
    }

    #[test]
    fn summary_always_names_the_repo(h in history()) {
        let s = summarize(&h, "https://example.com/r.git");
        prop_assert!(s.starts_with("Audit summary for https://example.com/r.git"));
    }
}
