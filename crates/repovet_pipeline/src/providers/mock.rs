//! Mock reasoning engine — deterministic scripted turns for testing and
//! offline runs, no API key required.

use crate::llm::LlmClient;
use anyhow::Result;
use repovet_core::message::Message;
use repovet_core::tools::ToolDescriptor;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Pops one pre-scripted agent turn per call; once the script is exhausted
/// it keeps answering with a final narrative, so a run always terminates.
#[derive(Default)]
pub struct MockClient {
    turns: Mutex<VecDeque<Message>>,
    calls: AtomicU32,
}

impl MockClient {
    pub fn scripted(turns: Vec<Message>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            calls: AtomicU32::new(0),
        }
    }

    /// A mock that immediately ends the run with the given narrative.
    pub fn final_only(narrative: &str) -> Self {
        Self::scripted(vec![Message::agent(narrative)])
    }

    /// How many reasoning turns have been requested so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Acquire)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    async fn next_turn(
        &self,
        _system: &str,
        _history: &[Message],
        _tools: &[ToolDescriptor],
    ) -> Result<Message> {
        self.calls.fetch_add(1, Ordering::AcqRel);
        let next = self.turns.lock().expect("mock script lock").pop_front();
        Ok(next.unwrap_or_else(|| Message::agent("(mock) audit complete, no further actions")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repovet_core::message::ToolCall;

    #[tokio::test]
    async fn test_scripted_turns_in_order() {
        let call = ToolCall {
            id: "c1".into(),
            name: "clone_repository".into(),
            args: Default::default(),
        };
        let mock = MockClient::scripted(vec![
            Message::agent_with_calls("cloning", vec![call]),
            Message::agent("done"),
        ]);

        let first = mock.next_turn("", &[], &[]).await.unwrap();
        assert_eq!(first.tool_calls.len(), 1);
        let second = mock.next_turn("", &[], &[]).await.unwrap();
        assert!(second.is_final_narrative());
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_script_terminates() {
        let mock = MockClient::default();
        let turn = mock.next_turn("", &[], &[]).await.unwrap();
        assert!(turn.is_final_narrative());
    }
}
