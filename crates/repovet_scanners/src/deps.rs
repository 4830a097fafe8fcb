//! Dependency audit via pip-audit.

use crate::process::{run_command, SCANNER_TIMEOUT};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use walkdir::WalkDir;

/// Return vulnerable dependency records as `name version – id (fixes)`.
///
/// A repo without a Python requirements file yields a single informational
/// finding, not an error.
pub async fn dependency_audit(repo_path: &Path) -> Result<Vec<String>> {
    let Some(requirements) = find_requirements(repo_path) else {
        return Ok(vec!["No Python requirements file found".to_string()]);
    };

    let mut cmd = Command::new("pip-audit");
    cmd.arg("-r").arg(&requirements).arg("-f").arg("json");

    let output = run_command(cmd, "pip-audit", SCANNER_TIMEOUT).await?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let text = if stdout.trim().is_empty() { "[]" } else { &stdout };
    let audits: Value = serde_json::from_str(text).context("pip-audit produced invalid JSON")?;
    Ok(fold_audits(&audits))
}

/// First `requirements*.txt` anywhere in the tree, in a stable walk order.
fn find_requirements(repo_path: &Path) -> Option<PathBuf> {
    WalkDir::new(repo_path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| {
            e.file_type().is_file()
                && e.file_name()
                    .to_str()
                    .map(|n| n.starts_with("requirements") && n.ends_with(".txt"))
                    .unwrap_or(false)
        })
        .map(|e| e.into_path())
}

fn fold_audits(audits: &Value) -> Vec<String> {
    audits
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|a| {
                    let fixes = a
                        .get("fix_versions")
                        .and_then(Value::as_array)
                        .map(|v| {
                            v.iter()
                                .filter_map(Value::as_str)
                                .collect::<Vec<_>>()
                                .join(", ")
                        })
                        .unwrap_or_default();
                    format!(
                        "{} {} – {} ({})",
                        a.get("name").and_then(Value::as_str).unwrap_or("?"),
                        a.get("version").and_then(Value::as_str).unwrap_or("?"),
                        a.get("id").and_then(Value::as_str).unwrap_or("?"),
                        fixes
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}
