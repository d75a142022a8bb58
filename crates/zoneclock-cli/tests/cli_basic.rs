//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary HOME so the
//! config file and database start fresh.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn cli(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_zoneclock-cli"));
    cmd.env("HOME", home)
        .env_remove("ZONECLOCK_ENV")
        .env("RUST_LOG", "off");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = cli(home)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");
    decode(output)
}

fn decode(output: Output) -> (String, String, i32) {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

#[test]
fn onboard_is_idempotent() {
    let home = tempfile::tempdir().unwrap();
    let first = run_cli_success(home.path(), &["onboard"]);
    assert!(first.contains("onboarding complete"));
    let second = run_cli_success(home.path(), &["onboard"]);
    assert!(second.contains("already onboarded"));
}

#[test]
fn settings_show_and_set() {
    let home = tempfile::tempdir().unwrap();
    let shown = run_cli_success(home.path(), &["settings", "show"]);
    let json: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(json["focus_duration"], 90);
    assert_eq!(json["break_duration"], 20);

    run_cli_success(home.path(), &["settings", "set", "focus_duration", "45"]);
    let value = run_cli_success(home.path(), &["settings", "get", "focus_duration"]);
    assert_eq!(value.trim(), "45");

    run_cli_success(home.path(), &["settings", "set", "sound.cue", "woodfish"]);
    let cue = run_cli_success(home.path(), &["settings", "get", "sound.cue"]);
    assert_eq!(cue.trim(), "woodfish");
}

#[test]
fn settings_reset_restores_defaults() {
    let home = tempfile::tempdir().unwrap();
    run_cli_success(home.path(), &["settings", "set", "notifications_enabled", "false"]);
    let value = run_cli_success(home.path(), &["settings", "get", "notifications_enabled"]);
    assert_eq!(value.trim(), "false");

    run_cli_success(home.path(), &["settings", "reset"]);
    let value = run_cli_success(home.path(), &["settings", "get", "notifications_enabled"]);
    assert_eq!(value.trim(), "true");
}

#[test]
fn invalid_settings_are_not_saved() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["settings", "set", "focus_duration", "5"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("focus duration"), "stderr: {stderr}");

    let (_, _, code) = run_cli(home.path(), &["settings", "set", "no_such_key", "1"]);
    assert_ne!(code, 0);

    let value = run_cli_success(home.path(), &["settings", "get", "focus_duration"]);
    assert_eq!(value.trim(), "90");
}

#[test]
fn stats_on_empty_history() {
    let home = tempfile::tempdir().unwrap();
    let today = run_cli_success(home.path(), &["stats", "today"]);
    let json: serde_json::Value = serde_json::from_str(&today).unwrap();
    assert_eq!(json["total_cycles"], 0);

    let week = run_cli_success(home.path(), &["stats", "week"]);
    let json: serde_json::Value = serde_json::from_str(&week).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 7);

    let weekly = run_cli_success(home.path(), &["stats", "weekly"]);
    let json: serde_json::Value = serde_json::from_str(&weekly).unwrap();
    assert_eq!(json[0]["weekday"], "Mon");

    let (_, _, code) = run_cli(home.path(), &["stats", "range", "2026-03-05", "2026-03-01"]);
    assert_ne!(code, 0);
}

#[test]
fn dnd_toggles() {
    let home = tempfile::tempdir().unwrap();
    run_cli_success(home.path(), &["dnd", "on"]);
    let status = run_cli_success(home.path(), &["dnd", "status"]);
    assert!(status.contains("on"));
    run_cli_success(home.path(), &["dnd", "off"]);
    let status = run_cli_success(home.path(), &["dnd", "status"]);
    assert!(status.contains("off"));
}

#[test]
fn config_get_set_list() {
    let home = tempfile::tempdir().unwrap();
    let file = run_cli_success(home.path(), &["config", "get", "storage.database_file"]);
    assert_eq!(file.trim(), "zoneclock.db");

    run_cli_success(home.path(), &["config", "set", "notifications.backend", "none"]);
    let list = run_cli_success(home.path(), &["config", "list"]);
    assert!(list.contains("notifications.backend = none"));

    let (_, _, code) = run_cli(home.path(), &["config", "set", "audio.backend", "speaker"]);
    assert_ne!(code, 0);
    let (_, _, code) = run_cli(home.path(), &["config", "get", "nope"]);
    assert_ne!(code, 0);
}

#[test]
fn run_requires_onboarding() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["run"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("onboard"));
}

#[test]
fn run_then_stop_records_a_cycle() {
    let home = tempfile::tempdir().unwrap();
    run_cli_success(home.path(), &["onboard"]);

    let mut child = cli(home.path())
        .args(["run", "--minutes", "15"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"s\n").unwrap();
    let (stdout, stderr, code) = decode(child.wait_with_output().unwrap());
    assert_eq!(code, 0, "run failed: {stderr}");

    let types: Vec<String> = stdout
        .lines()
        .map(|line| {
            let json: serde_json::Value = serde_json::from_str(line).unwrap();
            json["type"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(types.first().map(String::as_str), Some("CycleStarted"));
    assert_eq!(types.last().map(String::as_str), Some("TimerStopped"));

    let today = run_cli_success(home.path(), &["stats", "today"]);
    let json: serde_json::Value = serde_json::from_str(&today).unwrap();
    assert_eq!(json["total_cycles"], 1);
    assert_eq!(json["completed_cycles"], 0);
}
