//! CLI tests for `agentcycle init`, `trace` and `run`.
//!
//! Spawns the agentcycle binary against temp configs and verifies exit codes
//! and printed output.

use std::process::Command;

use agentcycle::exit_codes;
use agentcycle::io::config::{AppConfig, load_config};
use agentcycle::test_support::temp_config;

#[test]
fn trace_with_defaults_reports_completion_tick() {
    let (_dir, path) = temp_config(&AppConfig::default()).expect("config");

    let output = Command::new(env!("CARGO_BIN_EXE_agentcycle"))
        .arg("trace")
        .arg("--config")
        .arg(&path)
        .output()
        .expect("agentcycle trace");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("goal done by Agent1 at tick 21"), "{stdout}");
    assert_eq!(stdout.lines().count(), 23);
    assert!(stdout.lines().nth(11).expect("tick 11").contains("* Planning"));
}

#[test]
fn trace_rejects_malformed_goal() {
    let (_dir, path) = temp_config(&AppConfig::default()).expect("config");

    let output = Command::new(env!("CARGO_BIN_EXE_agentcycle"))
        .args(["trace", "--goal", "{not json"])
        .arg("--config")
        .arg(&path)
        .output()
        .expect("agentcycle trace");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("parse goal payload JSON"), "{stderr}");
}

#[test]
fn trace_rejects_invalid_config() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("agentcycle.toml");
    std::fs::write(&path, "tick_period_ms = 0\n").expect("write config");

    let status = Command::new(env!("CARGO_BIN_EXE_agentcycle"))
        .arg("trace")
        .arg("--config")
        .arg(&path)
        .status()
        .expect("agentcycle trace");

    assert_eq!(status.code(), Some(exit_codes::INVALID));
}

#[test]
fn init_writes_default_config_once() {
    let temp = tempfile::tempdir().expect("tempdir");

    let status = Command::new(env!("CARGO_BIN_EXE_agentcycle"))
        .current_dir(temp.path())
        .arg("init")
        .status()
        .expect("agentcycle init");
    assert_eq!(status.code(), Some(exit_codes::OK));

    let path = temp.path().join("agentcycle.toml");
    assert_eq!(load_config(&path).expect("load"), AppConfig::default());

    std::fs::write(&path, "goal_delay_ms = 5\n").expect("overwrite");
    let output = Command::new(env!("CARGO_BIN_EXE_agentcycle"))
        .current_dir(temp.path())
        .arg("init")
        .output()
        .expect("agentcycle init");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(String::from_utf8_lossy(&output.stdout).contains("already exists"));
    assert_eq!(load_config(&path).expect("load").goal_delay_ms, 5);
}

#[test]
fn run_exits_ok_once_a_goal_completes() {
    let cfg = AppConfig {
        tick_period_ms: 5,
        plan_ready_after_ms: 20,
        goal_done_after_ms: 40,
        ..AppConfig::default()
    };
    let (_dir, path) = temp_config(&cfg).expect("config");

    let output = Command::new(env!("CARGO_BIN_EXE_agentcycle"))
        .args(["run", "--goal", r#"{"goal_id": 1}"#])
        .arg("--config")
        .arg(&path)
        .output()
        .expect("agentcycle run");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Goal completed by Agent"), "{stdout}");
}
