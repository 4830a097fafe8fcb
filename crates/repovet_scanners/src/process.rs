//! Scanner process execution helper.

use anyhow::{Context, Result};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default wall-clock budget for one scanner invocation.
pub const SCANNER_TIMEOUT: Duration = Duration::from_secs(300);

/// Run a scanner command to completion with a timeout.
///
/// A non-zero exit status is NOT an error here: several scanners exit
/// non-zero when they find something. Callers inspect the `Output`.
pub async fn run_command(mut cmd: Command, what: &str, timeout: Duration) -> Result<Output> {
    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(res) => res.with_context(|| format!("Failed to execute {what}"))?,
        Err(_) => anyhow::bail!("{} timed out after {}s", what, timeout.as_secs()),
    };

    if !output.status.success() {
        tracing::debug!(
            "{} exited with {}: {}",
            what,
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}
