//! Integration tests for `dp qa`, `dp show` and plan migration on load.

mod common;

use common::{STRUCTURED_PLAN, TestEnv};
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_qa_on_empty_plan() {
    let env = TestEnv::init();
    let result = env.json(&["qa"]);
    assert_eq!(result["score"], 0);
    assert_eq!(result["disposition"], "CRITICAL_FAILURE");
    assert_eq!(result["initial"]["critical_failure"], true);
    assert_eq!(result["initial"]["verdicts"].as_array().unwrap().len(), 12);
}

#[test]
fn test_qa_without_init_creates_state() {
    let env = TestEnv::new();
    env.dp()
        .args(["qa", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QA score: 0/100"))
        .stdout(predicate::str::ends_with("Result: CRITICAL_FAILURE\n"));
    assert!(env.plan_path().exists());
}

#[test]
fn test_qa_does_not_repair() {
    let env = TestEnv::init();
    env.dp()
        .args(["config", "set", "auto-replan", "off"])
        .assert()
        .success();
    env.json(&STRUCTURED_PLAN);

    let before = std::fs::read_to_string(env.plan_path()).unwrap();
    env.dp()
        .args(["qa", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Result: NEEDS_REPLAN (score < 70)"))
        .stdout(predicate::str::contains("Auto replan triggered.").not());
    let after: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(env.plan_path()).unwrap()).unwrap();
    let before: serde_json::Value = serde_json::from_str(&before).unwrap();
    assert_eq!(before["references"], after["references"]);
}

#[test]
fn test_show_summary() {
    let env = TestEnv::init();
    env.dp()
        .args(["show", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan Ratio: n/a"))
        .stdout(predicate::str::contains("Insight Axes Covered: 0/8"));

    env.json(&STRUCTURED_PLAN);
    env.dp()
        .args(["show", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Goal: Launch beta"))
        .stdout(predicate::str::contains("Plan Tasks: 2"))
        .stdout(predicate::str::contains("Execution Tasks: 3"))
        .stdout(predicate::str::contains("Plan Ratio: 40.0%"))
        .stdout(predicate::str::contains("References: 3"))
        .stdout(predicate::str::contains("Insight Axes Covered: 8/8"))
        .stdout(predicate::str::contains("Risks: 1"));
}

#[test]
fn test_legacy_plan_is_migrated_on_load() {
    let env = TestEnv::new();
    std::fs::create_dir_all(env.state_path()).unwrap();
    std::fs::write(
        env.plan_path(),
        r#"{"version": "0.1.0", "goal": "Old", "tasks": ["a", "b", "c", "d", "e"], "owner": "ops"}"#,
    )
    .unwrap();

    let summary = env.json(&["show"]);
    assert_eq!(summary["plan_tasks"], 2);
    assert_eq!(summary["execution_tasks"], 3);

    let plan = env.plan();
    assert_eq!(plan["version"], "0.3.0");
    assert!(plan.get("tasks").is_none());
    assert_eq!(plan["execution_tasks"], json!(["c", "d", "e"]));
    assert_eq!(plan["owner"], "ops");
    assert_eq!(plan["insights"], json!([]));
}

#[test]
fn test_malformed_plan_fails() {
    let env = TestEnv::init();
    std::fs::write(env.plan_path(), "{ broken").unwrap();
    env.dp()
        .arg("qa")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Malformed plan document"));
    env.dp()
        .args(["qa", "-H"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: Storage error:"));
    assert_eq!(std::fs::read_to_string(env.plan_path()).unwrap(), "{ broken");
}
