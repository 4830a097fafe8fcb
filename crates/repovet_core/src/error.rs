//! Audit error taxonomy.
//!
//! Only setup-level and loop-level faults live here. Tool-level faults
//! (unknown tool, provider unavailable, timeout, malformed output) are
//! converted to in-band `ToolResult`s inside the invocation node and never
//! appear as variants of this enum.

use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// A required tool name is absent from the merged registry.
    /// Fatal, raised before any reasoning call; no partial registry exists.
    #[error("missing required tools: {}", format_missing(.missing))]
    Discovery { missing: BTreeSet<String> },

    #[error("reasoning engine call failed: {0}")]
    Model(String),

    /// The reasoning/tool cycle exceeded its configured bound.
    #[error("iteration limit reached after {0} reasoning turns")]
    IterationLimit(u32),

    /// The run was cancelled externally. Partial history is preserved.
    #[error("audit cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),
}

impl AuditError {
    /// Render as the `Error:`-prefixed string the orchestrator returns to
    /// its caller. Every fatal path terminates in one of these.
    pub fn to_summary(&self) -> String {
        format!("Error: {self}")
    }
}

fn format_missing(missing: &BTreeSet<String>) -> String {
    missing.iter().cloned().collect::<Vec<_>>().join(", ")
}
