//! Anthropic Messages API wire types, plus conversions between the flat
//! audit history model and the block-structured wire format.

use repovet_core::message::{Message as AuditMessage, Role as AuditRole, ToolCall};
use repovet_core::tools::ToolDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: ToolInputSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String, // usually "object"
    pub properties: Value,   // JSON Schema
    pub required: Vec<String>,
}

// Request payload
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

// Response payload
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert a `ToolDescriptor` into the wire tool definition.
///
/// Properties/required are lifted out of the descriptor's JSON schema; a
/// descriptor without them becomes an object schema with no parameters.
pub fn to_wire_tool(descriptor: &ToolDescriptor) -> Tool {
    let properties = descriptor
        .input_schema
        .get("properties")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));

    let required = descriptor
        .input_schema
        .get("required")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    Tool {
        name: descriptor.name.clone(),
        description: descriptor.description.clone(),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties,
            required,
        },
    }
}

/// Convert the flat audit history into wire messages.
///
/// Agent turns become assistant messages with text + tool_use blocks; tool
/// results become tool_result blocks, with consecutive ones merged into a
/// single user message as the Messages API requires.
pub fn to_wire_messages(history: &[AuditMessage]) -> Vec<Message> {
    let mut wire: Vec<Message> = Vec::new();

    for msg in history {
        match msg.role {
            AuditRole::User => {
                wire.push(Message {
                    role: Role::User,
                    content: vec![ContentBlock::Text {
                        text: msg.content.clone(),
                    }],
                });
            }
            AuditRole::Agent => {
                let mut blocks = Vec::new();
                if !msg.content.is_empty() {
                    blocks.push(ContentBlock::Text {
                        text: msg.content.clone(),
                    });
                }
                for call in &msg.tool_calls {
                    blocks.push(ContentBlock::ToolUse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input: Value::Object(call.args.clone()),
                    });
                }
                wire.push(Message {
                    role: Role::Assistant,
                    content: blocks,
                });
            }
            AuditRole::Tool => {
                // Faulted results carry the in-band error marker; surface it
                // as the wire-level flag too so the engine sees both.
                let block = ContentBlock::ToolResult {
                    tool_use_id: msg.correlation_id.clone().unwrap_or_default(),
                    content: msg.content.clone(),
                    is_error: msg.content.starts_with("Error:").then_some(true),
                };
                // Merge into the previous user message if it already carries
                // tool results from the same batch
                match wire.last_mut() {
                    Some(Message {
                        role: Role::User,
                        content,
                    }) if matches!(content.first(), Some(ContentBlock::ToolResult { .. })) => {
                        content.push(block);
                    }
                    _ => wire.push(Message {
                        role: Role::User,
                        content: vec![block],
                    }),
                }
            }
        }
    }

    wire
}

/// Collapse a wire response into one flat agent turn.
pub fn from_response(response: &MessagesResponse) -> AuditMessage {
    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for block in &response.content {
        match block {
            ContentBlock::Text { text: t } => text.push_str(t),
            ContentBlock::ToolUse { id, name, input } => {
                tool_calls.push(ToolCall {
                    id: id.clone(),
                    name: name.clone(),
                    args: input.as_object().cloned().unwrap_or_default(),
                });
            }
            ContentBlock::ToolResult { .. } => {}
        }
    }

    AuditMessage::agent_with_calls(text, tool_calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_wire_tool_extracts_schema() {
        let descriptor = ToolDescriptor {
            name: "run_semgrep_scan".into(),
            description: "Run a semgrep scan".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "repo_path": {"type": "string"},
                    "config": {"type": "string"}
                },
                "required": ["repo_path"]
            }),
        };
        let tool = to_wire_tool(&descriptor);
        assert_eq!(tool.input_schema.schema_type, "object");
        assert_eq!(tool.input_schema.required, vec!["repo_path"]);
        assert!(tool.input_schema.properties.get("config").is_some());
    }

    #[test]
    fn test_tool_results_merge_into_one_user_message() {
        let history = vec![
            AuditMessage::user("audit this"),
            AuditMessage::agent_with_calls(
                "",
                vec![
                    ToolCall {
                        id: "a".into(),
                        name: "clone_repository".into(),
                        args: Default::default(),
                    },
                    ToolCall {
                        id: "b".into(),
                        name: "run_semgrep_scan".into(),
                        args: Default::default(),
                    },
                ],
            ),
            AuditMessage::tool_result("a", "/work/repo"),
            AuditMessage::tool_result("b", "{\"results\":[]}"),
        ];

        let wire = to_wire_messages(&history);
        assert_eq!(wire.len(), 3);
        assert!(matches!(wire[2].role, Role::User));
        assert_eq!(wire[2].content.len(), 2);
    }

    #[test]
    fn test_faulted_tool_results_flagged_on_the_wire() {
        let history = vec![
            AuditMessage::agent_with_calls(
                "",
                vec![
                    ToolCall {
                        id: "a".into(),
                        name: "clone_repository".into(),
                        args: Default::default(),
                    },
                    ToolCall {
                        id: "b".into(),
                        name: "run_semgrep_scan".into(),
                        args: Default::default(),
                    },
                ],
            ),
            AuditMessage::tool_result("a", "/work/repo"),
            AuditMessage::tool_result("b", "Error: tool 'run_semgrep_scan' timed out after 120s"),
        ];

        let wire = to_wire_messages(&history);
        match (&wire[1].content[0], &wire[1].content[1]) {
            (
                ContentBlock::ToolResult { is_error: ok_flag, .. },
                ContentBlock::ToolResult { is_error: err_flag, .. },
            ) => {
                assert_eq!(*ok_flag, None);
                assert_eq!(*err_flag, Some(true));
            }
            other => panic!("Expected two tool_result blocks, got {other:?}"),
        }
    }

    #[test]
    fn test_from_response_collects_calls() {
        let response = MessagesResponse {
            content: vec![
                ContentBlock::Text {
                    text: "Cloning first.".into(),
                },
                ContentBlock::ToolUse {
                    id: "c1".into(),
                    name: "clone_repository".into(),
                    input: json!({"repo_url": "https://example.com/x.git"}),
                },
            ],
            stop_reason: Some("tool_use".into()),
        };
        let msg = from_response(&response);
        assert_eq!(msg.content, "Cloning first.");
        assert_eq!(msg.tool_calls.len(), 1);
        assert_eq!(
            msg.tool_calls[0].args.get("repo_url").and_then(|v| v.as_str()),
            Some("https://example.com/x.git")
        );
    }
}
