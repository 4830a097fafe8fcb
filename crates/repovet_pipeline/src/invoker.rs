//! Tool invocation node.
//!
//! Takes the tool-call batch of one agent turn, dispatches each call to its
//! owning provider through the registry, and returns one `ToolResult` per
//! call, in call order. Nothing escapes this node as an error: unknown
//! tools, provider faults, timeouts and oversized payloads all come back as
//! in-band error results so the reasoning engine can observe them.

use futures_util::future::join_all;
use repovet_core::config::AuditConfig;
use repovet_core::message::ToolCall;
use repovet_core::tools::ToolResult;
use repovet_mcp::CapabilityRegistry;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

pub struct ToolInvocationNode {
    registry: Arc<CapabilityRegistry>,
    call_timeout: Duration,
    max_payload_bytes: usize,
}

impl ToolInvocationNode {
    pub fn new(registry: Arc<CapabilityRegistry>, config: &AuditConfig) -> Self {
        Self {
            registry,
            call_timeout: Duration::from_secs(config.tool_timeout_secs),
            max_payload_bytes: config.max_payload_bytes,
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Dispatch a batch. Calls are independent of each other and run
    /// concurrently; the node waits for all of them (or their timeouts)
    /// before returning. Result order matches call order.
    pub async fn invoke(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        join_all(calls.iter().map(|call| self.invoke_one(call))).await
    }

    async fn invoke_one(&self, call: &ToolCall) -> ToolResult {
        let start = Instant::now();
        let result = self.dispatch(call).await;

        tracing::info!(
            tool = %call.name,
            call_id = %call.id,
            ok = !result.is_error,
            duration_ms = start.elapsed().as_millis() as u64,
            "tool call finished"
        );
        result
    }

    async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let Some(provider) = self.registry.provider_for(&call.name) else {
            return ToolResult::error(
                &call.id,
                format!("Error: unknown tool '{}'", call.name),
            );
        };

        // Arguments are validated once here, against the advertised schema;
        // providers never see a call missing a required field.
        if let Some(descriptor) = self.registry.lookup(&call.name) {
            let missing = missing_required_args(&descriptor.input_schema, &call.args);
            if !missing.is_empty() {
                return ToolResult::error(
                    &call.id,
                    format!(
                        "Error: invalid arguments for tool '{}': missing required field(s) {}",
                        call.name,
                        missing.join(", ")
                    ),
                );
            }
        }

        let args = Value::Object(call.args.clone());
        match timeout(self.call_timeout, provider.call(&call.name, &args)).await {
            Ok(Ok(content)) => {
                ToolResult::ok(&call.id, clamp_payload(content, self.max_payload_bytes))
            }
            Ok(Err(e)) => ToolResult::error(&call.id, format!("Error: {e}")),
            Err(_) => ToolResult::error(
                &call.id,
                format!(
                    "Error: tool '{}' timed out after {}s",
                    call.name,
                    self.call_timeout.as_secs()
                ),
            ),
        }
    }
}

/// Required fields of the tool's JSON schema that the call did not supply.
fn missing_required_args(schema: &Value, args: &Map<String, Value>) -> Vec<String> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|required| {
            required
                .iter()
                .filter_map(Value::as_str)
                .filter(|field| !args.contains_key(*field))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Cap a payload at `max_bytes`, cutting on a char boundary and appending a
/// marker. Oversized output is truncated, never dropped.
fn clamp_payload(content: String, max_bytes: usize) -> String {
    if content.len() <= max_bytes {
        return content;
    }
    let mut cut = max_bytes;
    while cut > 0 && !content.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... [truncated {} bytes]", &content[..cut], content.len() - cut)
}
