//! repovet_scanners — the ad hoc tool set.
//!
//! Direct pass-throughs to scanner processes (git, trufflehog, semgrep,
//! pip-audit), independent of the orchestration loop. These exist for
//! synchronous one-shot use; the loop talks to scanners through MCP
//! providers instead.

pub mod deps;
pub mod git;
pub mod process;
pub mod secrets;
pub mod semgrep;

pub use deps::dependency_audit;
pub use git::checkout_repo;
pub use secrets::api_key_inspector;
pub use semgrep::input_security_analyzer;
