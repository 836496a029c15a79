//! Integration tests for `dp config` and output-format precedence.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_config_list_defaults() {
    let env = TestEnv::init();
    let result = env.json(&["config", "list"]);
    let entries = result["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["key"], "output-format");
    assert_eq!(entries[0]["value"], "json");
    assert!(entries.iter().all(|e| e["source"] == "default"));
}

#[test]
fn test_config_set_writes_session_kdl() {
    let env = TestEnv::init();
    let result = env.json(&["config", "set", "event-log", "no"]);
    assert_eq!(result["value"], "false");

    let kdl = std::fs::read_to_string(env.state_path().join("config.kdl")).unwrap();
    assert!(kdl.contains("event-log"));

    let value = env.json(&["config", "get", "event-log"]);
    assert_eq!(value["value"], "false");
    assert_eq!(value["source"], "session");

    env.json(&["plan", "--goal", "Quiet"]);
    assert!(env.journal("events.jsonl").is_empty());
}

#[test]
fn test_config_rejects_unknown_key_and_bad_value() {
    let env = TestEnv::init();
    env.dp()
        .args(["config", "set", "editor", "vim"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
    env.dp()
        .args(["config", "set", "output-format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("output-format"));
    env.dp()
        .args(["config", "get", "editor"])
        .assert()
        .failure();
}

#[test]
fn test_session_output_format_switches_to_human() {
    let env = TestEnv::init();
    env.json(&["config", "set", "output-format", "human"]);
    env.dp()
        .arg("qa")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("QA score: 0/100"));
}

#[test]
fn test_env_output_format_beats_session() {
    let env = TestEnv::init();
    env.json(&["config", "set", "output-format", "json"]);
    env.dp()
        .env("DP_OUTPUT_FORMAT", "human")
        .args(["config", "get", "output-format"])
        .assert()
        .success()
        .stdout("output-format = human (env:DP_OUTPUT_FORMAT)\n");
}

#[test]
fn test_cli_flag_beats_env() {
    let env = TestEnv::init();
    env.dp()
        .env("DP_OUTPUT_FORMAT", "json")
        .args(["config", "get", "output-format", "-H"])
        .assert()
        .success()
        .stdout("output-format = human (cli)\n");
}

#[test]
fn test_system_config_is_read() {
    let env = TestEnv::init();
    std::fs::write(env.config_dir.path().join("config.kdl"), "auto-replan #false\n").unwrap();
    let value = env.json(&["config", "get", "auto-replan"]);
    assert_eq!(value["value"], "false");
    assert_eq!(value["source"], "system");
}

#[test]
fn test_malformed_system_config_fails() {
    let env = TestEnv::init();
    std::fs::write(env.config_dir.path().join("config.kdl"), "auto-replan \"").unwrap();
    env.dp()
        .arg("qa")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config error"));
}
