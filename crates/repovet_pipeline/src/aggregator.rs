//! Result aggregator — folds a terminal history into the report string.
//!
//! Pure function of the history: no clock, no randomness, stable ordering,
//! so identical histories always produce byte-identical summaries.

use repovet_core::message::{Message, Role, ToolCall};
use std::collections::HashMap;

const RAW_PREVIEW_CHARS: usize = 200;

/// Summarize a terminal history.
///
/// Scans from the end backward: the first agent message without tool calls
/// is the final narrative and terminates the scan. Every tool message
/// before it is resolved to its originating call via `correlation_id` —
/// never by position — and rendered by tool name.
pub fn summarize(history: &[Message], repo_url: &str) -> String {
    let calls: HashMap<&str, &ToolCall> = history
        .iter()
        .flat_map(|m| m.tool_calls.iter())
        .map(|c| (c.id.as_str(), c))
        .collect();

    let mut narrative = None;
    let mut cutoff = history.len();
    for (i, msg) in history.iter().enumerate().rev() {
        if msg.is_final_narrative() {
            narrative = Some(msg);
            cutoff = i;
            break;
        }
    }

    let mut summary = format!("Audit summary for {repo_url}:\n");

    for msg in &history[..cutoff] {
        if msg.role != Role::Tool {
            continue;
        }
        let Some(id) = msg.correlation_id.as_deref() else {
            continue;
        };
        match calls.get(id) {
            Some(call) => summary.push_str(&render_tool_result(call, &msg.content)),
            None => {
                // Violates the 1:1 correlation invariant; surface rather than drop
                summary.push_str(&format!("- Unmatched tool result (id {id})\n"));
            }
        }
    }

    if let Some(msg) = narrative {
        if !msg.content.is_empty() {
            summary.push_str(&format!("\nFinal assessment: {}\n", msg.content));
        }
    }

    summary.trim_end().to_string()
}

/// Tool-specific rendering. Extend here when new scanner tools join the
/// loop; unknown tools get the generic preview line.
fn render_tool_result(call: &ToolCall, payload: &str) -> String {
    match call.name.as_str() {
        "clone_repository" => {
            if payload.starts_with("Error:") {
                format!("- Repository clone failed: {payload}\n")
            } else {
                format!("- Repository cloned to: {payload}\n")
            }
        }
        "run_semgrep_scan" => render_semgrep(payload),
        name => format!("- {}: {}\n", name, preview(payload)),
    }
}

fn render_semgrep(payload: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(data) => {
            if let Some(err) = data.get("error").and_then(|v| v.as_str()) {
                format!("- Semgrep scan failed: {err}\n")
            } else {
                let findings = data
                    .get("results")
                    .and_then(|v| v.as_array())
                    .map(|r| r.len())
                    .unwrap_or(0);
                format!("- Semgrep scan completed. Found {findings} potential findings.\n")
            }
        }
        // Recovered locally: truncated raw text instead of a crash
        Err(_) => format!(
            "- Semgrep scan returned non-JSON output (parse error): {}\n",
            preview(payload)
        ),
    }
}

fn preview(payload: &str) -> String {
    if payload.chars().count() <= RAW_PREVIEW_CHARS {
        payload.to_string()
    } else {
        let head: String = payload.chars().take(RAW_PREVIEW_CHARS).collect();
        format!("{head}...")
    }
}
