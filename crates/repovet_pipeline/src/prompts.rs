//! Prompt text for the audit loop.

pub const SYSTEM_PROMPT: &str = "You are a security-audit orchestrator. \
You are given tools to clone a repository and run scanners against it. \
Use the tools to carry out the requested audit, one step at a time, and \
finish with a short narrative of what was done and what was found. \
If a tool reports an error, you may adapt (for example retry with other \
arguments) or stop and report the failure.";

/// The seed instruction that opens every run's history.
pub fn seed_instruction(repo_url: &str) -> String {
    format!(
        "Perform a security audit on the repository: {repo_url}. \
         First, clone the repository using the 'clone_repository' tool. \
         Then, run a semgrep scan on the cloned path using 'run_semgrep_scan', \
         passing 'auto' as the config argument."
    )
}
