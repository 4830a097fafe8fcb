//! CLI smoke tests — verify basic binary behavior.

use std::process::Command;

fn cli_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_repovet"))
}

#[test]
fn test_help_flag() {
    let output = cli_bin().arg("--help").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage"),
        "Expected usage info in --help output"
    );
    assert!(stdout.contains("--mock"));
}

#[test]
fn test_version_flag() {
    let output = cli_bin().arg("--version").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("repovet"),
        "Expected binary name in --version output"
    );
}

#[test]
fn test_missing_repo_url_is_an_error() {
    let output = cli_bin().output().expect("failed to run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("repo_url") || stderr.contains("REPO_URL"));
}

#[test]
fn test_mock_run_without_providers_reports_missing_tools() {
    // No config file ⇒ no providers ⇒ required tools are missing; the
    // binary must print an Error: line and exit cleanly, not panic.
    let output = cli_bin()
        .arg("--mock")
        .arg("--config")
        .arg("/tmp/nonexistent_repovet_config_12345.toml")
        .arg("https://example.com/acme.git")
        .output()
        .expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Error:"), "got: {stdout}");
    assert!(stdout.contains("clone_repository"));
    assert!(stdout.contains("run_semgrep_scan"));
}
