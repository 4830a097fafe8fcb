//! Shallow repository checkout into a uniquely namespaced directory.

use crate::process::{run_command, SCANNER_TIMEOUT};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use uuid::Uuid;

/// Clone the repo and return the local path.
///
/// Each clone gets its own `<stem>_<8-hex>` directory under `workspace`, so
/// concurrent audits of the same URL never collide.
pub async fn checkout_repo(url: &str, workspace: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(workspace).await?;
    let target = workspace.join(format!(
        "{}_{}",
        repo_stem(url),
        &Uuid::new_v4().simple().to_string()[..8]
    ));

    let mut cmd = Command::new("git");
    cmd.args(["clone", "--depth", "1", url])
        .arg(&target);

    let output = run_command(cmd, "git clone", SCANNER_TIMEOUT).await?;
    if !output.status.success() {
        // Don't leave a half-written clone behind
        let _ = tokio::fs::remove_dir_all(&target).await;
        anyhow::bail!(
            "git clone failed for {}: {}",
            url,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(target)
}

/// Last path segment of the URL, without a trailing `.git`.
fn repo_stem(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let stem = last.trim_end_matches(".git");
    if stem.is_empty() {
        "repo".to_string()
    } else {
        stem.to_string()
    }
}
