//! End-to-end runs of the `rulemine` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn rulemine(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rulemine"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RULEMINE_LOG")
        .output()
        .unwrap()
}

fn repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("orders.sql"),
        "SELECT * FROM orders\nWHERE total > 100\n  AND status = 'open';\n",
    )
    .unwrap();
    dir
}

/// A single format without --out goes to stdout.
#[test]
fn test_analyze_to_stdout() {
    let dir = repo();
    let out = rulemine(&["analyze", "--format", "json"], dir.path());
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["rules"].as_array().map(Vec::len), Some(2));
}

/// Dry run prints statistics and writes nothing.
#[test]
fn test_dry_run_writes_nothing() {
    let dir = repo();
    let out = rulemine(&["analyze", "--dry-run", "--out", "model.dmn"], dir.path());
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("files scanned: 1"), "stdout: {stdout}");
    assert!(stdout.contains("validation: 2"), "stdout: {stdout}");
    assert!(!dir.path().join("model.dmn").exists());
}

/// Validation passes on a fresh document and exits 1 once the source drifts.
#[test]
fn test_validate_exit_status() {
    let dir = repo();
    let out = rulemine(&["analyze", "--out", "model.dmn"], dir.path());
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let ok = rulemine(&["validate", "--dmn", "model.dmn"], dir.path());
    assert_eq!(ok.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&ok.stdout).contains("# Trace Validation Report"));

    fs::write(dir.path().join("orders.sql"), "SELECT 1;\n").unwrap();
    let stale = rulemine(&["validate", "--dmn", "model.dmn"], dir.path());
    assert_eq!(stale.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&stale.stdout).contains("## Failures"));
}

/// Errors exit with status 2 and a coded message.
#[test]
fn test_errors_exit_two() {
    let dir = repo();
    let out = rulemine(&["validate", "--dmn", "missing.dmn"], dir.path());
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("RULEMINE_CLI_VALIDATION_FAILED"));

    let bad = rulemine(&["analyze", "--min-confidence", "3"], dir.path());
    assert_eq!(bad.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&bad.stderr).contains("RULEMINE_CLI_CONFIG_ERROR"));
}

/// The config command reflects the project file.
#[test]
fn test_config_dump() {
    let dir = repo();
    fs::write(dir.path().join("rulemine.toml"), "[grouping]\nmethod = \"structural\"\n").unwrap();
    let out = rulemine(&["config"], dir.path());
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("method = \"structural\""), "config: {text}");
}

/// `--config` names the file to read in place of the project file.
#[test]
fn test_config_flag() {
    let dir = repo();
    fs::write(dir.path().join("rulemine.toml"), "[grouping]\nmethod = \"structural\"\n").unwrap();
    fs::write(dir.path().join("ci.toml"), "[grouping]\nmethod = \"threshold\"\n").unwrap();

    let out = rulemine(&["config", "--config", "ci.toml"], dir.path());
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("method = \"threshold\""), "config: {text}");
    assert!(!text.contains("structural"), "config: {text}");

    let missing = rulemine(&["--config", "nope.toml", "analyze", "--dry-run"], dir.path());
    assert_eq!(missing.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&missing.stderr).contains("RULEMINE_CLI_CONFIG_ERROR"));
}
