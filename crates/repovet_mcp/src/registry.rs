//! Capability registry: the merged tool catalog of all connected providers.

use repovet_core::error::AuditError;
use repovet_core::tools::{ToolDescriptor, ToolProvider};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

struct RegisteredTool {
    descriptor: ToolDescriptor,
    provider: Arc<dyn ToolProvider>,
}

/// Name → descriptor map over every connected provider, built once per run.
///
/// Collision policy: last-registered wins, with a warning. Provider order in
/// the config therefore decides which implementation answers a shared name.
pub struct CapabilityRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("tools", &self.tools.keys().collect::<BTreeSet<_>>())
            .finish()
    }
}

impl CapabilityRegistry {
    /// Merge the catalogs of all providers and validate the `required` set.
    ///
    /// Fails with `AuditError::Discovery` listing every missing required
    /// name; no partial registry is returned. A provider whose catalog
    /// request fails aborts discovery (the run cannot know which names it
    /// would have contributed).
    pub async fn discover(
        providers: Vec<Arc<dyn ToolProvider>>,
        required: &[&str],
        max_providers: usize,
    ) -> Result<Self, AuditError> {
        if providers.len() > max_providers {
            return Err(AuditError::Config(format!(
                "{} providers configured, limit is {}",
                providers.len(),
                max_providers
            )));
        }

        let mut tools: HashMap<String, RegisteredTool> = HashMap::new();
        for provider in providers {
            let catalog = provider.catalog().await.map_err(|e| {
                AuditError::Config(format!(
                    "catalog discovery failed for provider '{}': {}",
                    provider.name(),
                    e
                ))
            })?;
            tracing::info!(
                "Provider '{}': {} tool(s) discovered",
                provider.name(),
                catalog.len()
            );
            for descriptor in catalog {
                if let Some(previous) = tools.get(&descriptor.name) {
                    tracing::warn!(
                        "Tool '{}' from provider '{}' overrides the one from '{}'",
                        descriptor.name,
                        provider.name(),
                        previous.provider.name()
                    );
                }
                tools.insert(
                    descriptor.name.clone(),
                    RegisteredTool {
                        descriptor,
                        provider: provider.clone(),
                    },
                );
            }
        }

        let missing: BTreeSet<String> = required
            .iter()
            .filter(|name| !tools.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AuditError::Discovery { missing });
        }

        Ok(Self { tools })
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name).map(|t| &t.descriptor)
    }

    /// The provider that owns a tool, for dispatch.
    pub fn provider_for(&self, name: &str) -> Option<Arc<dyn ToolProvider>> {
        self.tools.get(name).map(|t| t.provider.clone())
    }

    /// All descriptors, sorted by name for a stable prompt ordering.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut all: Vec<ToolDescriptor> =
            self.tools.values().map(|t| t.descriptor.clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    struct FakeProvider {
        name: &'static str,
        tools: Vec<&'static str>,
    }

    #[async_trait::async_trait]
    impl ToolProvider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn catalog(&self) -> anyhow::Result<Vec<ToolDescriptor>> {
            Ok(self
                .tools
                .iter()
                .map(|t| ToolDescriptor {
                    name: t.to_string(),
                    description: format!("{t} (from {})", self.name),
                    input_schema: json!({"type": "object", "properties": {}}),
                })
                .collect())
        }

        async fn call(&self, tool: &str, _args: &Value) -> anyhow::Result<String> {
            Ok(format!("{tool} via {}", self.name))
        }
    }

    fn provider(name: &'static str, tools: Vec<&'static str>) -> Arc<dyn ToolProvider> {
        Arc::new(FakeProvider { name, tools })
    }

    #[tokio::test]
    async fn test_discover_merges_catalogs() {
        let registry = CapabilityRegistry::discover(
            vec![
                provider("git", vec!["clone_repository"]),
                provider("semgrep", vec!["run_semgrep_scan"]),
            ],
            &["clone_repository", "run_semgrep_scan"],
            8,
        )
        .await
        .unwrap();

        assert_eq!(
            registry.tool_names(),
            vec!["clone_repository", "run_semgrep_scan"]
        );
        assert!(registry.lookup("clone_repository").is_some());
        assert!(registry.lookup("nonexistent").is_none());
    }

    #[tokio::test]
    async fn test_discover_fails_on_missing_required() {
        let err = CapabilityRegistry::discover(
            vec![provider("git", vec!["clone_repository"])],
            &["clone_repository", "run_semgrep_scan"],
            8,
        )
        .await
        .unwrap_err();

        match err {
            AuditError::Discovery { missing } => {
                assert_eq!(missing.len(), 1);
                assert!(missing.contains("run_semgrep_scan"));
            }
            other => panic!("Expected Discovery error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_collision_last_registered_wins() {
        let registry = CapabilityRegistry::discover(
            vec![
                provider("first", vec!["run_semgrep_scan"]),
                provider("second", vec!["run_semgrep_scan"]),
            ],
            &["run_semgrep_scan"],
            8,
        )
        .await
        .unwrap();

        let owner = registry.provider_for("run_semgrep_scan").unwrap();
        assert_eq!(owner.name(), "second");
        assert!(registry
            .lookup("run_semgrep_scan")
            .unwrap()
            .description
            .contains("from second"));
    }

    #[tokio::test]
    async fn test_provider_cap_enforced() {
        let providers: Vec<Arc<dyn ToolProvider>> =
            (0..3).map(|_| provider("p", vec!["t"])).collect();
        let err = CapabilityRegistry::discover(providers, &[], 2)
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }
}
