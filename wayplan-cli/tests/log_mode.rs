//! The configured `log_mode` and the verbosity flags.

mod common;

use common::TestEnv;
use predicates::prelude::*;

fn with_config(contents: &str) -> TestEnv {
    let env = TestEnv::new();
    std::fs::create_dir_all(&env.data_dir).unwrap();
    std::fs::write(env.data_dir.join("config.yaml"), contents).unwrap();
    env
}

#[test]
fn test_default_log_mode_hides_info() {
    let env = TestEnv::new();
    env.command()
        .args(["plan", "create", "--title", "Trip", "--budget", "10"])
        .assert()
        .success()
        .stderr(predicate::str::contains("INFO:").not());
}

#[test]
fn test_config_log_mode_verbose_shows_info() {
    let env = with_config("log_mode: verbose\n");
    env.command()
        .args(["plan", "create", "--title", "Trip", "--budget", "10"])
        .assert()
        .success()
        .stderr(predicate::str::contains("INFO: created travel plan"));
}

#[test]
fn test_quiet_flag_overrides_config_log_mode() {
    let env = with_config("log_mode: verbose\n");
    env.command()
        .args(["--quiet", "plan", "create", "--title", "Trip", "--budget", "10"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_env_log_mode_overrides_config() {
    let env = with_config("log_mode: verbose\n");
    env.command()
        .env("WAYPLAN_LOG_MODE", "normal")
        .args(["plan", "create", "--title", "Trip", "--budget", "10"])
        .assert()
        .success()
        .stderr(predicate::str::contains("INFO:").not());
}
