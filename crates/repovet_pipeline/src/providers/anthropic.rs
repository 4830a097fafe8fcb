//! Anthropic Messages API client.
//!
//! Credentials and endpoint come from the explicit `LlmConfig` handed in at
//! construction; this module never reads the process environment.

use crate::api_types::{self, MessagesRequest, MessagesResponse};
use crate::llm::LlmClient;
use crate::retry::{with_retry, RetryConfig};
use anyhow::{Context, Result};
use repovet_core::config::LlmConfig;
use repovet_core::error::AuditError;
use repovet_core::message::Message;
use repovet_core::tools::ToolDescriptor;
use reqwest::Client;

const RESPONSE_PREVIEW_CHARS: usize = 2000;

/// Debug-log preview of a raw response body, cut on char boundaries.
fn response_preview(text: &str) -> String {
    text.chars().take(RESPONSE_PREVIEW_CHARS).collect()
}

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicClient {
    pub fn new(config: &LlmConfig) -> Result<Self, AuditError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AuditError::Config("no Anthropic API key configured".into()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    #[tracing::instrument(skip(self, system, history, tools), fields(model = %self.model))]
    async fn next_turn(
        &self,
        system: &str,
        history: &[Message],
        tools: &[ToolDescriptor],
    ) -> Result<Message> {
        let url = format!("{}/v1/messages", self.base_url);

        let request_body = MessagesRequest {
            model: self.model.clone(),
            system: if system.is_empty() {
                None
            } else {
                Some(system.to_string())
            },
            messages: api_types::to_wire_messages(history),
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            tools: tools.iter().map(api_types::to_wire_tool).collect(),
        };

        if tracing::enabled!(tracing::Level::DEBUG) {
            let tools_json = serde_json::to_string(&request_body.tools).unwrap_or_default();
            tracing::debug!(
                "Anthropic tools payload ({}): {}",
                request_body.tools.len(),
                tools_json
            );
        }

        let retry_config = RetryConfig::default();
        let client = &self.client;
        let api_key = &self.api_key;

        let response = with_retry(&retry_config, "Anthropic", || async {
            let resp = client
                .post(&url)
                .header("x-api-key", api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&request_body)
                .send()
                .await
                .context("Failed to send request to Anthropic")?;
            Ok(resp)
        })
        .await?;

        let resp_text = response.text().await?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                "Anthropic raw response (first {RESPONSE_PREVIEW_CHARS} chars): {}",
                response_preview(&resp_text)
            );
        }
        let api_response: MessagesResponse =
            serde_json::from_str(&resp_text).context("Failed to parse Anthropic response")?;

        Ok(api_types::from_response(&api_response))
    }
}
