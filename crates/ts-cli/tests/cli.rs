//! Binary-level tests for the `ts` CLI.
//!
//! Every test runs with an isolated HOME and points the backend at a
//! closed local port, so nothing here needs a running server.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Discard port; connections are refused on test machines.
const UNREACHABLE_API: &str = "http://127.0.0.1:9/api";

fn ts_binary() -> String {
    env!("CARGO_BIN_EXE_ts").to_string()
}

fn ts(home: &Path, args: &[&str]) -> Output {
    Command::new(ts_binary())
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("TS_API_URL", UNREACHABLE_API)
        .env("TS_TIMEOUT_SECS", "2")
        .env_remove("TS_WEEKLY_TARGET_HOURS")
        .args(args)
        .output()
        .expect("failed to run ts")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    let output = ts(temp.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["track", "add", "list", "edit", "delete", "summary"] {
        assert!(stdout.contains(command), "help should mention {command}");
    }
}

#[test]
fn test_add_rejects_bad_duration_before_contacting_backend() {
    let temp = TempDir::new().unwrap();
    let output = ts(
        temp.path(),
        &[
            "add",
            "--project",
            "Mobile App",
            "--task",
            "Testing",
            "--duration",
            "1:75:00",
        ],
    );

    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("invalid duration '1:75:00'"), "{stderr}");
}

#[test]
fn test_add_rejects_blank_project() {
    let temp = TempDir::new().unwrap();
    let output = ts(
        temp.path(),
        &["add", "--project", "  ", "--task", "Testing", "--duration", "1:00:00"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("project cannot be empty"));
}

#[test]
fn test_list_reports_unreachable_backend() {
    let temp = TempDir::new().unwrap();
    let output = ts(temp.path(), &["list"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed to list entries"));
}

#[test]
fn test_list_rejects_bad_since() {
    let temp = TempDir::new().unwrap();
    let output = ts(temp.path(), &["list", "--since", "last tuesday"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid datetime"));
}

#[test]
fn test_summary_rejects_zero_target() {
    let temp = TempDir::new().unwrap();
    let output = ts(temp.path(), &["summary", "--target", "0"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("weekly target must be a positive number of hours"));
}

#[test]
fn test_bad_weekly_target_only_blocks_summary() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("ts.toml");
    std::fs::write(&config, "weekly_target_hours = 0.0\n").unwrap();
    let config = config.to_str().unwrap();

    let output = ts(temp.path(), &["--config", config, "delete", "entry-1"]);
    assert!(!output.status.success());
    let stderr_text = stderr(&output);
    assert!(stderr_text.contains("failed to delete entry entry-1"), "{stderr_text}");
    assert!(!stderr_text.contains("weekly target"), "{stderr_text}");

    let output = ts(temp.path(), &["--config", config, "summary"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("weekly target must be a positive number of hours"));
}

#[test]
fn test_config_file_with_bad_url_is_reported() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("ts.toml");
    std::fs::write(&config, "api_url = \"ftp://example.com/api\"\n").unwrap();

    let output = Command::new(ts_binary())
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join(".config"))
        .env_remove("TS_API_URL")
        .arg("--config")
        .arg(&config)
        .arg("list")
        .output()
        .expect("failed to run ts");

    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid base URL"));
}
