//! Audit conversation model — shared between the pipeline and the aggregator.
//!
//! History is an append-only sequence of `Message`s: it is never mutated in
//! place and never reordered. Tool results are linked back to the call that
//! produced them via `correlation_id`, never by position in the history.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The reasoning engine.
    Agent,
    /// A tool result fed back into the conversation.
    Tool,
    /// Seed instruction (and tool-result carrier on the wire).
    User,
}

/// One tool invocation requested by the reasoning engine.
///
/// `id` is unique within the lifetime of one audit run and never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: Map<String, Value>,
}

/// One entry in the audit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For `Role::Tool` messages: the id of the `ToolCall` this answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            correlation_id: None,
        }
    }

    /// A final narrative from the reasoning engine (no tool calls).
    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
            tool_calls: Vec::new(),
            correlation_id: None,
        }
    }

    pub fn agent_with_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
            tool_calls,
            correlation_id: None,
        }
    }

    pub fn tool_result(correlation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            correlation_id: Some(correlation_id.into()),
        }
    }

    /// True for the message that ends a run: an agent turn with no tool calls.
    pub fn is_final_narrative(&self) -> bool {
        self.role == Role::Agent && self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_narrative_detection() {
        assert!(Message::agent("done").is_final_narrative());
        assert!(!Message::user("go").is_final_narrative());

        let call = ToolCall {
            id: "c1".into(),
            name: "clone_repository".into(),
            args: Map::new(),
        };
        assert!(!Message::agent_with_calls("cloning", vec![call]).is_final_narrative());
    }

    #[test]
    fn test_tool_result_carries_correlation() {
        let msg = Message::tool_result("c1", "/work/repo");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.correlation_id.as_deref(), Some("c1"));
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn test_message_roundtrip_serde() {
        let call = ToolCall {
            id: "c1".into(),
            name: "run_semgrep_scan".into(),
            args: serde_json::from_value(serde_json::json!({"repo_path": "/tmp/x"})).unwrap(),
        };
        let msg = Message::agent_with_calls("scanning", vec![call]);
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tool_calls.len(), 1);
        assert_eq!(back.tool_calls[0].name, "run_semgrep_scan");
    }
}
