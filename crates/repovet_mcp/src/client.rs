//! MCP child-process tool provider.
//!
//! Spawns one provider process per config entry, performs the MCP handshake
//! and exposes catalog discovery + invocation through the `ToolProvider`
//! trait. The connection is held open for the lifetime of the run; dropping
//! the provider cancels the service and reaps the child.

use anyhow::Result;
use repovet_core::config::ProviderConfig;
use repovet_core::tools::{ToolDescriptor, ToolProvider};
use rmcp::model::{CallToolRequestParams, CallToolResult, RawContent};
use rmcp::service::{RoleClient, RunningService, ServiceExt};
use rmcp::transport::TokioChildProcess;
use serde_json::Value;
use tokio::process::Command;
use tokio::sync::Mutex;

pub struct McpProvider {
    name: String,
    service: Mutex<Option<RunningService<RoleClient, ()>>>,
    peer: rmcp::service::Peer<RoleClient>,
}

impl McpProvider {
    /// Spawn the provider process and complete the MCP handshake.
    pub async fn connect(config: &ProviderConfig) -> Result<Self> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args);
        for (k, v) in &config.env {
            cmd.env(k, v);
        }

        let transport = TokioChildProcess::new(cmd)?;
        let service = ().serve(transport).await.map_err(|e| {
            anyhow::anyhow!("MCP handshake failed for '{}': {}", config.name, e)
        })?;
        let peer = service.peer().clone();

        tracing::info!("Connected MCP provider '{}'", config.name);
        Ok(Self {
            name: config.name.clone(),
            service: Mutex::new(Some(service)),
            peer,
        })
    }

    /// Cancel the service and kill the child process.
    pub async fn disconnect(&self) {
        if let Some(service) = self.service.lock().await.take() {
            if let Err(e) = service.cancel().await {
                tracing::warn!("Error cancelling MCP provider '{}': {:?}", self.name, e);
            }
            tracing::info!("MCP provider '{}' disconnected", self.name);
        }
    }
}

#[async_trait::async_trait]
impl ToolProvider for McpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn catalog(&self) -> Result<Vec<ToolDescriptor>> {
        let tools = self.peer.list_all_tools().await.map_err(|e| {
            anyhow::anyhow!("list_tools failed for '{}': {}", self.name, e)
        })?;
        Ok(tools.iter().map(convert_mcp_tool).collect())
    }

    async fn call(&self, tool: &str, args: &Value) -> Result<String> {
        let params = CallToolRequestParams {
            meta: None,
            name: tool.to_string().into(),
            arguments: args.as_object().cloned(),
            task: None,
        };

        let result = self
            .peer
            .call_tool(params)
            .await
            .map_err(|e| anyhow::anyhow!("MCP tool '{}' failed: {}", tool, e))?;

        let (content, is_error) = convert_call_result(result);
        if is_error {
            anyhow::bail!("{}", content);
        }
        Ok(content)
    }
}

/// Convert MCP CallToolResult → (text content, is_error).
fn convert_call_result(result: CallToolResult) -> (String, bool) {
    let is_error = result.is_error.unwrap_or(false);

    // Concatenate all text content blocks
    let content: String = result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    let content = if content.is_empty() {
        "[no output]".to_string()
    } else {
        content
    };

    (content, is_error)
}

/// Convert rmcp::model::Tool → ToolDescriptor for the registry.
fn convert_mcp_tool(mcp_tool: &rmcp::model::Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: mcp_tool.name.to_string(),
        description: mcp_tool
            .description
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default(),
        input_schema: Value::Object(mcp_tool.input_schema.as_ref().clone()),
    }
}
