//! Orchestration state machine — the authoritative audit loop.
//!
//! Alternates between a reasoning turn (`Agent`) and a tool batch (`Tools`)
//! over an append-only history until the engine answers without tool calls,
//! a fatal error occurs, the iteration cap is hit, or the run is cancelled.
//! All run-scoped state lives in `RunState`; nothing is shared between
//! concurrent runs.

use crate::aggregator;
use crate::invoker::ToolInvocationNode;
use crate::llm::LlmClient;
use crate::prompts;
use repovet_core::error::AuditError;
use repovet_core::message::Message;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// External cancellation handle. Cancelling moves the machine to `Done`
/// before its next reasoning turn; partial history is preserved.
#[derive(Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// All mutable state of one audit run. Created per run, mutated only by the
/// state machine, returned intact (with partial history) on any outcome.
#[derive(Debug)]
pub struct RunState {
    pub run_id: Uuid,
    pub repo_url: String,
    pub history: Vec<Message>,
    pub error: Option<AuditError>,
    pub iteration_count: u32,
}

impl RunState {
    fn new(repo_url: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            repo_url: repo_url.to_string(),
            history: Vec::new(),
            error: None,
            iteration_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Agent,
    Tools,
    Done,
}

pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    invoker: ToolInvocationNode,
    max_iterations: u32,
    cancel: CancelHandle,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        invoker: ToolInvocationNode,
        max_iterations: u32,
        cancel: CancelHandle,
    ) -> Self {
        Self {
            llm,
            invoker,
            max_iterations,
            cancel,
        }
    }

    /// Run the audit loop to completion and return the terminal `RunState`.
    /// Fatal conditions are recorded in `RunState.error`; the history is
    /// never discarded.
    pub async fn run(&self, repo_url: &str) -> RunState {
        let mut state = RunState::new(repo_url);
        state
            .history
            .push(Message::user(prompts::seed_instruction(repo_url)));

        let tools = self.invoker.registry().descriptors();
        let mut phase = Phase::Agent;

        tracing::info!(run_id = %state.run_id, repo_url, "audit run started");

        while phase != Phase::Done {
            match phase {
                Phase::Agent => {
                    if self.cancel.is_cancelled() {
                        state.error = Some(AuditError::Cancelled);
                        phase = Phase::Done;
                        continue;
                    }

                    state.iteration_count += 1;
                    if state.iteration_count > self.max_iterations {
                        state.error = Some(AuditError::IterationLimit(self.max_iterations));
                        phase = Phase::Done;
                        continue;
                    }

                    tracing::debug!(
                        run_id = %state.run_id,
                        iteration = state.iteration_count,
                        "reasoning turn"
                    );
                    match self
                        .llm
                        .next_turn(prompts::SYSTEM_PROMPT, &state.history, &tools)
                        .await
                    {
                        Ok(turn) => {
                            let wants_tools = !turn.tool_calls.is_empty();
                            state.history.push(turn);
                            phase = if wants_tools { Phase::Tools } else { Phase::Done };
                        }
                        Err(e) => {
                            state.error = Some(AuditError::Model(e.to_string()));
                            phase = Phase::Done;
                        }
                    }
                }
                Phase::Tools => {
                    // The last message is always the agent turn that put us here
                    let calls = state
                        .history
                        .last()
                        .map(|m| m.tool_calls.clone())
                        .unwrap_or_default();
                    let results = self.invoker.invoke(&calls).await;
                    for result in results {
                        state.history.push(Message::tool_result(
                            result.correlation_id,
                            result.content,
                        ));
                    }
                    // Tools → Agent is unconditional
                    phase = Phase::Agent;
                }
                Phase::Done => unreachable!(),
            }
        }

        match &state.error {
            Some(e) => tracing::warn!(run_id = %state.run_id, error = %e, "audit run failed"),
            None => tracing::info!(
                run_id = %state.run_id,
                iterations = state.iteration_count,
                "audit run finished"
            ),
        }
        state
    }

    /// Run and fold the outcome into the single summary string this system
    /// hands to its caller. Fatal conditions render as `Error: ...`.
    pub async fn run_to_summary(&self, repo_url: &str) -> String {
        let state = self.run(repo_url).await;
        match &state.error {
            Some(e) => e.to_summary(),
            None => aggregator::summarize(&state.history, &state.repo_url),
        }
    }
}
