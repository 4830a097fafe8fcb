use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

/// Full configuration for one audit run.
///
/// Loaded once (TOML file + env overrides) and passed explicitly into the
/// pipeline constructors. Core logic never reads the process environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RepovetConfig {
    pub llm: LlmConfig,
    pub audit: AuditConfig,
    pub providers: Vec<ProviderConfig>,
}

impl RepovetConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: RepovetConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if the file doesn't exist, return defaults
    /// with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    /// This is the only place the environment is consulted.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ANTHROPIC_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("ANTHROPIC_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("ANTHROPIC_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("REPOVET_MAX_ITERATIONS") {
            if let Ok(n) = v.parse() {
                self.audit.max_iterations = n;
            }
        }
        if let Ok(v) = std::env::var("REPOVET_TOOL_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.audit.tool_timeout_secs = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    /// Taken from ANTHROPIC_API_KEY at load time; absent ⇒ fail before
    /// the first reasoning call.
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            api_key: None,
            max_tokens: 4096,
            temperature: 0.0,
        }
    }
}

/// Bounds for the orchestration loop and its tool batches.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum entries into the reasoning state per run.
    pub max_iterations: u32,
    /// Per-tool-call timeout inside one batch.
    pub tool_timeout_secs: u64,
    /// Tool payloads larger than this are truncated in the invocation node.
    pub max_payload_bytes: usize,
    /// Maximum number of provider connections per run.
    pub max_providers: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tool_timeout_secs: 120,
            max_payload_bytes: 256 * 1024,
            max_providers: 8,
        }
    }
}

/// One tool-provider process: spawned as a child and spoken to over stdio.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = RepovetConfig::default();
        assert_eq!(cfg.audit.max_iterations, 10);
        assert_eq!(cfg.audit.tool_timeout_secs, 120);
        assert_eq!(cfg.audit.max_providers, 8);
        assert!(cfg.llm.api_key.is_none());
        assert!(cfg.providers.is_empty());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[llm]
model = "claude-haiku-4"
"#;
        let cfg: RepovetConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.model, "claude-haiku-4");
        // Defaults for unspecified fields
        assert_eq!(cfg.llm.max_tokens, 4096);
        assert_eq!(cfg.audit.max_iterations, 10);
    }

    #[test]
    fn test_parse_providers_toml() {
        let toml_str = r#"
[audit]
max_iterations = 4

[[providers]]
name = "git"
command = "repovet-git-server"

[[providers]]
name = "semgrep"
command = "python"
args = ["semgrep_mcp_server.py"]

[providers.env]
SEMGREP_TIMEOUT = "300"
"#;
        let cfg: RepovetConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.audit.max_iterations, 4);
        assert_eq!(cfg.providers.len(), 2);
        assert_eq!(cfg.providers[0].name, "git");
        assert_eq!(cfg.providers[1].args, vec!["semgrep_mcp_server.py"]);
        assert_eq!(
            cfg.providers[1].env.get("SEMGREP_TIMEOUT").map(String::as_str),
            Some("300")
        );
    }
}
