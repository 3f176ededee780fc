//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_regrow"))
        .args(args)
        .env("REGROW_DATA_DIR", data_dir)
        .env_remove("REGROW_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_progress_show_on_fresh_journey() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_json(dir.path(), &["progress", "show", "--json"]);

    assert_eq!(report["streak"]["totalAttempts"], 0);
    assert_eq!(report["growthStage"]["id"], "seed");
    assert_eq!(report["checkpoint"]["nextCheckpoint"]["id"], "6h");
    assert!(dir.path().join("regrow.db").exists());
}

#[test]
fn test_progress_show_text() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["progress", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Streak:"));
    assert!(stdout.contains("Seed"));
}

#[test]
fn test_record_list_and_edit_relapse() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_cli(
        dir.path(),
        &[
            "relapse",
            "record",
            "--at",
            "2024-05-01T21:30:00Z",
            "--note",
            "late night",
            "--tag",
            "tired",
        ],
    );
    assert_eq!(code, 0, "record failed: {stderr}");
    assert!(stdout.contains("Relapse recorded:"));

    let events = run_json(dir.path(), &["relapse", "list", "--json"]);
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["timestamp"], "2024-05-01T21:30:00.000Z");
    assert_eq!(events[0]["note"], "late night");
    let id = events[0]["id"].as_str().unwrap().to_string();

    let (code, _, stderr) = run_cli(dir.path(), &["relapse", "edit", &id, "--clear-tags"]);
    assert_eq!(code, 0, "edit failed: {stderr}");

    let events = run_json(dir.path(), &["relapse", "list", "--json"]);
    assert!(events[0].get("tags").is_none());
    assert_eq!(events[0]["timestamp"], "2024-05-01T21:30:00.000Z");
}

#[test]
fn test_edit_unknown_relapse_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["relapse", "edit", "missing", "--note", "x"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_record_rejects_bad_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["relapse", "record", "--at", "yesterday"]);
    assert_ne!(code, 0);
}

#[test]
fn test_stats_counts_relapses() {
    let dir = tempfile::tempdir().unwrap();
    for at in ["2024-05-01T08:00:00Z", "2024-05-03T08:00:00Z"] {
        let (code, _, _) = run_cli(dir.path(), &["relapse", "record", "--at", at]);
        assert_eq!(code, 0);
    }
    let stats = run_json(dir.path(), &["stats", "--json"]);
    assert_eq!(stats["totalAttempts"], 2);
    assert!(stats["latestEventId"].is_string());
}

#[test]
fn test_achievements_listing() {
    let dir = tempfile::tempdir().unwrap();
    let list = run_json(dir.path(), &["progress", "achievements", "--json"]);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 12);
    assert_eq!(list[0]["id"], "first-steps");
    assert_eq!(list[0]["unlocked"], false);

    let (code, _, _) = run_cli(
        dir.path(),
        &["config", "set", "display.show_locked_achievements", "false"],
    );
    assert_eq!(code, 0);
    let list = run_json(dir.path(), &["progress", "achievements", "--json"]);
    assert!(list.as_array().unwrap().is_empty());

    let list = run_json(dir.path(), &["progress", "achievements", "--json", "--all"]);
    assert_eq!(list.as_array().unwrap().len(), 12);
}

#[test]
fn test_watch_stops_after_ticks() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_cli(
        dir.path(),
        &["watch", "--interval-ms", "100", "--ticks", "3", "--json"],
    );
    assert_eq!(code, 0, "watch failed: {stderr}");

    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in lines {
        let tick: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(tick["celebration"].is_null());
        assert_eq!(tick["report"]["growthStage"]["id"], "seed");
    }
}

#[test]
fn test_config_get_set_reset() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "ticker.interval_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1000");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "ticker.interval_ms", "500"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "ticker.interval_ms"]);
    assert_eq!(stdout.trim(), "500");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "ticker.interval_ms", "10"]);
    assert_ne!(code, 0);

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "nope"]);
    assert_ne!(code, 0);

    let (code, _, _) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let config = run_json(dir.path(), &["config", "list"]);
    assert_eq!(config["ticker"]["interval_ms"], 1000);
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("regrow"));
}

#[test]
fn test_record_message_follows_resolved_streak() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["relapse", "record"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("A new streak starts now."));

    let (code, stdout, _) = run_cli(
        dir.path(),
        &["relapse", "record", "--at", "2024-05-01T08:00:00Z"],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("Logged as a past relapse."));
    assert!(!stdout.contains("A new streak"));
}
