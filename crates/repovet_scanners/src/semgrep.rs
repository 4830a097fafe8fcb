//! Input-handling analysis via semgrep's managed `p/ci` ruleset.

use crate::process::{run_command, SCANNER_TIMEOUT};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tokio::process::Command;

const RULESET: &str = "p/ci";

/// Return potential XSS / SQL-i / etc. findings as `path:line – check_id`.
pub async fn input_security_analyzer(repo_path: &Path) -> Result<Vec<String>> {
    let mut cmd = Command::new("semgrep");
    cmd.arg("scan")
        .arg("--json")
        .arg("--config")
        .arg(RULESET)
        .arg(repo_path);

    let output = run_command(cmd, "semgrep", SCANNER_TIMEOUT).await?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let text = if stdout.trim().is_empty() { "{}" } else { &stdout };
    let data: Value = serde_json::from_str(text).context("semgrep produced invalid JSON")?;
    Ok(fold_results(&data))
}

fn fold_results(data: &Value) -> Vec<String> {
    data.get("results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .map(|d| {
                    format!(
                        "{}:{} – {}",
                        d.get("path").and_then(Value::as_str).unwrap_or("?"),
                        d.pointer("/start/line").and_then(Value::as_u64).unwrap_or(0),
                        d.get("check_id").and_then(Value::as_str).unwrap_or("?")
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fold_results() {
        let data = json!({
            "results": [
                {"path": "app/views.py", "start": {"line": 42}, "check_id": "python.flask.xss"},
                {"path": "db.py", "start": {"line": 7}, "check_id": "python.sqli"}
            ]
        });
        let folded = fold_results(&data);
        assert_eq!(folded[0], "app/views.py:42 – python.flask.xss");
        assert_eq!(folded[1], "db.py:7 – python.sqli");
    }

    #[test]
    fn test_fold_empty_output() {
        assert!(fold_results(&json!({})).is_empty());
        assert!(fold_results(&json!({"results": []})).is_empty());
    }
}
