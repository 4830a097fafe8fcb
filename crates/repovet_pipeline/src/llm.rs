//! Reasoning-engine seam.
//!
//! The state machine only needs one operation: given the full history and
//! the available tools, produce the next agent turn. Everything else about
//! the model (transport, auth, retry) is the provider's concern.

use anyhow::Result;
use async_trait::async_trait;
use repovet_core::message::Message;
use repovet_core::tools::ToolDescriptor;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Produce the next agent turn: either a final narrative (no tool
    /// calls) or one or more tool-call requests.
    async fn next_turn(
        &self,
        system: &str,
        history: &[Message],
        tools: &[ToolDescriptor],
    ) -> Result<Message>;
}
