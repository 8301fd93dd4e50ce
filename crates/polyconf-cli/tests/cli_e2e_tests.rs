//! CLI end-to-end tests that invoke the compiled `polyconf` binary.
//!
//! Every test runs inside a temporary directory that doubles as the
//! working directory and the platform config home, so only files the
//! test writes are discovered.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

/// A `polyconf` command isolated in `dir`.
fn polyconf(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("polyconf").expect("Failed to find polyconf binary");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("POLYCONF_CONFIG")
        .env_remove("WIDGET_TIMEOUT")
        .env_remove("WIDGET_RETRIES");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_exits_zero() {
    let temp = TempDir::new().unwrap();
    polyconf(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("explain"));
}

// ============================================================================
// resolve
// ============================================================================

#[test]
fn test_resolve_file_and_env() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "widget.toml", "timeout = 10\nretries = 3\n");

    let output = polyconf(temp.path())
        .arg("resolve")
        .env("WIDGET_TIMEOUT", "30")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output), json!({"timeout": 30, "retries": 3}));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Result Status:"), "stderr: {stderr}");
    assert!(stderr.contains("SUCCESS"), "stderr: {stderr}");
}

#[test]
fn test_resolve_given_wins() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "widget.toml", "timeout = 10\nretries = 3\n");

    let output = polyconf(temp.path())
        .args(["resolve", "--set", "timeout=99"])
        .env("WIDGET_TIMEOUT", "30")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output), json!({"timeout": 99, "retries": 3}));
}

#[test]
fn test_resolve_missing_file_is_degraded() {
    let temp = TempDir::new().unwrap();

    let output = polyconf(temp.path())
        .args(["resolve", "-o", "raw"])
        .env("WIDGET_TIMEOUT", "30")
        .output()
        .unwrap();

    assert!(output.status.success(), "degraded still exits 0");
    let raw = stdout_json(&output);
    assert_eq!(raw["status"], json!("DEGRADED"));
    assert_eq!(raw["values"]["timeout"]["value"], json!(30));
    assert_eq!(raw["values"]["timeout"]["source"], json!("env"));

    let file = raw["layers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|layer| layer["source"] == "file")
        .unwrap();
    assert_eq!(file["outcome"]["kind"], json!("error"));
}

#[test]
fn test_resolve_failed_exits_one() {
    let temp = TempDir::new().unwrap();

    polyconf(temp.path())
        .args(["resolve", "-p", "file"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("FAILED"));
}

#[test]
fn test_resolve_unknown_plugin() {
    let temp = TempDir::new().unwrap();

    polyconf(temp.path())
        .args(["resolve", "-p", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown plugin: nope"));
}

#[test]
fn test_resolve_serialized_is_sorted() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "widget.json", "{\"timeout\": 10, \"db\": {\"port\": 1, \"host\": \"h\"}}");

    polyconf(temp.path())
        .args(["resolve", "-o", "serialized", "-p", "file"])
        .assert()
        .success()
        .stdout(
            "{\n  \"db\": {\n    \"host\": \"h\",\n    \"port\": 1\n  },\n  \"timeout\": 10\n}\n",
        );
}

#[test]
fn test_resolve_settings_file_default_select() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "widget.yaml", "retries: 3\n");
    write(temp.path(), "settings.toml", "default_select = [\"file\"]\n");

    let output = polyconf(temp.path())
        .args(["resolve", "-o", "raw", "--config", "settings.toml"])
        .env("WIDGET_TIMEOUT", "30")
        .output()
        .unwrap();

    assert!(output.status.success());
    let raw = stdout_json(&output);
    assert_eq!(raw["layers"].as_array().unwrap().len(), 1);
    assert_eq!(raw["values"]["retries"]["source"], json!("file"));
    assert!(raw["values"].get("timeout").is_none());
}

#[test]
fn test_resolve_missing_settings_file_fails() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "widget.yaml", "retries: 3\n");

    polyconf(temp.path())
        .args(["resolve", "--config", "missing.toml"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Settings file not found: missing.toml"));
}

#[test]
fn test_resolve_empty_prefix_skips_env() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "widget.toml", "timeout = 10\n");

    let output = polyconf(temp.path())
        .args(["resolve", "--app-prefix", "", "-o", "raw"])
        .env("WIDGET_TIMEOUT", "30")
        .output()
        .unwrap();

    let raw = stdout_json(&output);
    assert_eq!(raw["values"]["timeout"]["value"], json!(10));
    assert_eq!(raw["status"], json!("DEGRADED"));
}

#[test]
fn test_resolve_invalid_override() {
    let temp = TempDir::new().unwrap();

    polyconf(temp.path())
        .args(["resolve", "--set", "timeout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected key.path=value"));
}

// ============================================================================
// list / explain
// ============================================================================

#[test]
fn test_list_shows_execution_order() {
    let temp = TempDir::new().unwrap();

    let output = polyconf(temp.path()).arg("list").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let defaults = stdout.find("defaults").unwrap();
    let file = stdout.find("file").unwrap();
    let env = stdout.find("env").unwrap();
    assert!(defaults < file && file < env, "unexpected order:\n{stdout}");
}

#[test]
fn test_explain_names_source() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "widget.toml", "timeout = 10\n[db]\nhost = \"h\"\nport = 1\n");

    polyconf(temp.path())
        .args(["explain", "db"])
        .env("WIDGET_DB__PORT", "5433")
        .assert()
        .success()
        .stdout(predicate::str::contains("db.host = \"h\""))
        .stdout(predicate::str::contains("db.port = 5433"))
        .stdout(predicate::str::contains("env"));
}

#[test]
fn test_explain_missing_path() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "widget.toml", "timeout = 10\n");

    polyconf(temp.path())
        .args(["explain", "db.host"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No value at 'db.host'"));
}
