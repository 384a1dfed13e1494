//! CLI argument and validation tests. No AWS calls are made.
//!
//! Every test runs against the in-memory backend or fails before any adapter
//! is consulted.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("profile-gateway");
    cmd.env_remove("PROFILE_GATEWAY_REPLAY")
        .env_remove("PROFILE_GATEWAY_REC")
        .env_remove("PROFILE_GATEWAY_CONFIG")
        .env_remove("MODEL_CONFIG_PATH")
        .env("PROFILE_GATEWAY_BACKEND", "memory");
    cmd
}

/// Sample configuration shipped with the repository.
fn config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config").join("models.toml")
}

fn call(args: &[&str]) -> Command {
    let mut cmd = cmd();
    cmd.arg("--config").arg(config_path()).arg("call").args(args);
    cmd
}

#[test]
fn missing_subcommand_exits_with_usage() {
    cmd().assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_config_file_is_fatal() {
    cmd()
        .args(["--config", "/nonexistent/models.toml", "call"])
        .args(["-t", "teama", "-a", "get", "-m", "claude"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config error"));
}

#[test]
fn malformed_registry_key_is_fatal() {
    let dir = std::env::temp_dir().join("profile_gateway_cli_bad_config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("models.toml");
    std::fs::write(
        &path,
        concat!(
            "[model_registry]\n",
            "claude = \"anthropic.claude\"\n\n",
            "[validation]\n",
            "valid_teams = [\"teama\"]\n",
            "default_version = \"3.5\"\n\n",
            "[aws_config]\n",
            "region = \"us-west-2\"\n",
            "dynamodb_table = \"team-profile\"\n",
        ),
    )
    .unwrap();

    cmd()
        .arg("--config")
        .arg(&path)
        .args(["call", "-t", "teama", "-a", "get", "-m", "claude"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config error"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unknown_team_is_rejected() {
    call(&["-t", "teamz", "-a", "get", "-m", "claude"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""status": "error""#))
        .stderr(predicate::str::contains("Invalid team_tag. Must be one of: teama, teamb, teamc"));
}

#[test]
fn unknown_action_is_rejected() {
    call(&["-t", "teama", "-a", "update", "-m", "claude"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid action"));
}

#[test]
fn use_without_message_is_rejected() {
    call(&["-t", "teama", "-a", "use", "-m", "claude"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("user_message is required for 'use' action"));
}

#[test]
fn get_without_record_is_not_found() {
    call(&["-t", "teama", "-a", "get", "-m", "claude"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("No profile found for team teama with model claude"));
}

#[test]
fn create_against_memory_backend() {
    call(&["-t", "teamb", "-a", "create", "-m", "claude", "--model-version", "3.7"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status": "success""#))
        .stdout(predicate::str::contains("application-inference-profile/"))
        .stdout(predicate::str::contains(
            "arn:aws:bedrock:us-west-2:000000000000:inference-profile/\
             us.anthropic.claude-3-7-sonnet-20250219-v1:0",
        ));
}

#[test]
fn health_against_memory_backend() {
    cmd()
        .arg("--config")
        .arg(config_path())
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bedrock service is healthy"))
        .stdout(predicate::str::contains("claude_3.5"));
}
