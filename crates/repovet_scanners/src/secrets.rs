//! Secret detection via trufflehog.

use crate::process::{run_command, SCANNER_TIMEOUT};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tokio::process::Command;

/// Return any suspected secrets in the repo, one finding string per hit.
pub async fn api_key_inspector(repo_path: &Path) -> Result<Vec<String>> {
    let scratch = tempfile::tempdir().context("Failed to create scratch dir")?;
    let out_file = scratch.path().join("results.json");

    let mut cmd = Command::new("trufflehog");
    cmd.arg("filesystem")
        .arg(repo_path)
        .arg("--json")
        .arg("--output")
        .arg(&out_file);
    run_command(cmd, "trufflehog", SCANNER_TIMEOUT).await?;

    if !out_file.exists() {
        return Ok(Vec::new());
    }
    let raw = tokio::fs::read_to_string(&out_file)
        .await
        .context("Failed to read trufflehog output")?;
    let findings: Value =
        serde_json::from_str(&raw).context("trufflehog produced invalid JSON")?;
    Ok(fold_findings(&findings))
}

fn fold_findings(findings: &Value) -> Vec<String> {
    findings
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    format!(
                        "{}: {}",
                        item.get("Line").and_then(Value::as_str).unwrap_or("?"),
                        item.get("SourceType").and_then(Value::as_str).unwrap_or("?")
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}
