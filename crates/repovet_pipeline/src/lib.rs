//! repovet_pipeline — the audit orchestration core.
//!
//! - **llm / providers**: reasoning-engine seam (Anthropic + mock)
//! - **invoker**: concurrent tool-batch dispatch with in-band faults
//! - **machine**: the bounded Agent ↔ Tools state machine
//! - **aggregator**: terminal history → report string

pub mod aggregator;
pub mod api_types;
pub mod invoker;
pub mod llm;
pub mod machine;
pub mod prompts;
pub mod providers;
pub mod retry;

pub use aggregator::summarize;
pub use invoker::ToolInvocationNode;
pub use llm::LlmClient;
pub use machine::{CancelHandle, Orchestrator, RunState};
pub use providers::{AnthropicClient, MockClient};

/// Tools the primary loop cannot run without; discovery fails fast when any
/// of these are absent from the merged catalogs.
pub const REQUIRED_TOOLS: &[&str] = &["clone_repository", "run_semgrep_scan"];
