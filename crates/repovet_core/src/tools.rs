//! Tool abstraction types — shared between the capability registry, the
//! invocation node and the provider transports.
//!
//! The pipeline depends only on the `ToolProvider` trait; it never assumes a
//! particular transport, so tests can substitute in-memory fakes for the
//! MCP child-process client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description of one callable tool, as advertised by a provider catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's argument object.
    pub input_schema: Value,
}

/// Result of executing one `ToolCall`, keyed back by `correlation_id`.
///
/// Provider faults never cross the invocation-node boundary as errors; they
/// are carried in-band here so the reasoning engine can see and react to
/// them like any other tool output.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub correlation_id: String,
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn ok(correlation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(correlation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// A connected tool provider: one request/response channel per provider
/// process, supporting catalog discovery and invocation by name.
#[async_trait::async_trait]
pub trait ToolProvider: Send + Sync {
    /// Provider name, for logging and collision warnings.
    fn name(&self) -> &str;

    /// Enumerate the tools this provider exposes.
    async fn catalog(&self) -> anyhow::Result<Vec<ToolDescriptor>>;

    /// Invoke a tool by name with a JSON argument object.
    ///
    /// A provider-side failure (including a tool that reports its own error)
    /// is an `Err` here; the invocation node converts it to an in-band
    /// `ToolResult`.
    async fn call(&self, tool: &str, args: &Value) -> anyhow::Result<String>;
}
