//! Common test utilities for CLI integration tests.
//!
//! Every test gets its own temporary data directory, and commands run with
//! the `WAYPLAN_*` variables cleared so the host environment cannot leak in.

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

const ENV_VARS: [&str; 5] = [
    "WAYPLAN_DATA_DIR",
    "WAYPLAN_BUSY_TIMEOUT",
    "WAYPLAN_DATABASE_PATH",
    "WAYPLAN_PAGE_SIZE",
    "WAYPLAN_LOG_MODE",
];

/// Test environment with isolated data directory.
pub struct TestEnv {
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
    /// Path to the wayplan data directory
    pub data_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment; the data directory is not created yet.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        let data_dir = temp_path.join("wayplan-data");

        Self {
            temp_dir,
            temp_path,
            data_dir,
        }
    }

    /// Command with only the binary and a clean environment.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("wayplan").expect("Failed to find wayplan binary");
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Command with `--data-dir` pointing at this environment.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--data-dir").arg(&self.data_dir);
        cmd
    }

    /// Run a command that must succeed and return its trimmed stdout.
    pub fn run_ok(&self, args: &[&str]) -> String {
        let output = self
            .command()
            .args(args)
            .output()
            .expect("Failed to run wayplan");
        assert!(
            output.status.success(),
            "wayplan {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout)
            .expect("Invalid UTF-8")
            .trim()
            .to_string()
    }

    /// Create a plan and return its id.
    pub fn create_plan(&self, title: &str, budget: u32) -> String {
        self.run_ok(&["plan", "create", "--title", title, "--budget", &budget.to_string()])
    }

    /// Add a location and return its id.
    pub fn add_location(&self, plan_id: &str, name: &str, budget: u32) -> String {
        self.run_ok(&[
            "location",
            "add",
            plan_id,
            "--name",
            name,
            "--budget",
            &budget.to_string(),
        ])
    }

    /// Fetch a plan detail as JSON.
    pub fn show_json(&self, plan_id: &str) -> serde_json::Value {
        let stdout = self.run_ok(&["plan", "show", plan_id, "--with-locations", "--format", "json"]);
        serde_json::from_str(&stdout).expect("plan show did not print JSON")
    }
}
