//! Common test utilities for dp integration tests.
//!
//! Provides `TestEnv` for isolated test environments that never touch the
//! user's config directory or the current working directory.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// Each `TestEnv` creates two temporary directories:
/// - `work_dir`: Acts as the directory dp runs in
/// - `config_dir`: Holds the system config.kdl (via `DP_CONFIG_DIR`)
///
/// The `dp()` method returns a `Command` that sets `DP_STATE_DIR` and
/// `DP_CONFIG_DIR` per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a new test environment and run `dp init`.
    pub fn init() -> Self {
        let env = Self::new();
        env.dp().arg("init").assert().success();
        env
    }

    /// Get a Command for the dp binary with an isolated state directory.
    pub fn dp(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_dp"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("DP_STATE_DIR", self.state_path());
        cmd.env("DP_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("DP_DIR");
        cmd.env_remove("DP_OUTPUT_FORMAT");
        cmd.env_remove("DP_LOG");
        cmd
    }

    /// Run dp with `args` in JSON mode, assert success and parse stdout.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self.dp().args(args).assert().success().get_output().clone();
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Read `<state>/<name>` as JSON lines.
    pub fn journal(&self, name: &str) -> Vec<Value> {
        std::fs::read_to_string(self.state_path().join(name))
            .unwrap()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    /// Read the persisted plan.
    pub fn plan(&self) -> Value {
        serde_json::from_str(&std::fs::read_to_string(self.plan_path()).unwrap()).unwrap()
    }

    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    pub fn state_path(&self) -> PathBuf {
        self.work_dir.path().join(".deeplan")
    }

    pub fn plan_path(&self) -> PathBuf {
        self.state_path().join("plan.json")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Flags describing a plan that scores 35 before auto replan.
pub const STRUCTURED_PLAN: [&str; 13] = [
    "plan",
    "--goal",
    "Launch beta",
    "--success-metric",
    "50 signups",
    "--deadline",
    "2026-12-01",
    "--plan-tasks",
    "scope,design",
    "--execution-tasks",
    "build,test,ship",
    "--definition-of-done",
    "Beta live",
];
