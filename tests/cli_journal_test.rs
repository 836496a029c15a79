//! Integration tests for `dp decide` and `dp risk`.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_decide_appends_record() {
    let env = TestEnv::init();
    env.dp()
        .args([
            "decide",
            "--title",
            "Storage",
            "--chosen",
            "JSON files",
            "--reason",
            " No server needed ",
            "--rejected",
            "sqlite, ,postgres",
            "-H",
        ])
        .assert()
        .success()
        .stdout("Decision recorded.\n");

    let records = env.journal("decisions.jsonl");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["title"], "Storage");
    assert_eq!(records[0]["reason"], "No server needed");
    assert_eq!(records[0]["rejected"], json!(["sqlite", "postgres"]));
    assert!(records[0]["ts"].as_str().unwrap().ends_with("+00:00"));
}

#[test]
fn test_decide_without_rejected() {
    let env = TestEnv::new();
    let result = env.json(&["decide", "--title", "t", "--chosen", "c", "--reason", "r"]);
    assert_eq!(result["recorded"]["rejected"], json!([]));
    assert_eq!(env.journal("decisions.jsonl").len(), 1);
}

#[test]
fn test_decide_requires_fields() {
    let env = TestEnv::init();
    env.dp()
        .args(["decide", "--title", "t"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--chosen"));
}

#[test]
fn test_risk_goes_to_journal_only() {
    let env = TestEnv::init();
    env.dp()
        .args([
            "risk",
            "--risk",
            "Scope creep",
            "--signal",
            "New asks weekly",
            "--mitigation",
            "Freeze scope",
            "-H",
        ])
        .assert()
        .success()
        .stdout("Risk recorded.\n");
    env.json(&[
        "risk",
        "--risk",
        "Burnout",
        "--signal",
        "Missed check-ins",
        "--mitigation",
        "Cut scope",
    ]);

    let records = env.journal("risks.jsonl");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["signal"], "New asks weekly");
    assert_eq!(records[1]["risk"], "Burnout");
    assert_eq!(env.plan()["risks"], json!([]));
}
