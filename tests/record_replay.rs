//! Cassette replay integration tests. Zero network I/O.
//!
//! All tests set `PROFILE_GATEWAY_REPLAY` to a cassette file path so that the
//! binary never contacts AWS.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("profile-gateway")
}

/// Absolute path to the `test_fixtures` directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
}

fn config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config").join("models.toml")
}

fn replay(cassette: &Path, args: &[&str]) -> Command {
    let mut cmd = cmd();
    cmd.env("PROFILE_GATEWAY_REPLAY", cassette)
        .env_remove("PROFILE_GATEWAY_REC")
        .env_remove("PROFILE_GATEWAY_BACKEND")
        .arg("--config")
        .arg(config_path())
        .arg("call")
        .args(args);
    cmd
}

/// Write a cassette to a temp file and return its path.
fn temp_cassette(name: &str, yaml: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("profile_gateway_replay_tests");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{name}.cassette.yaml"));
    std::fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn create_happy_path() {
    let cassette = fixtures_dir().join("create_teama.cassette.yaml");
    replay(&cassette, &["-t", "teama", "-a", "create", "-m", "claude", "--model-version", "3.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "arn:aws:bedrock:us-west-2:111122223333:application-inference-profile/k2x9q7w1m3",
        ))
        .stdout(predicate::str::contains(
            "arn:aws:bedrock:us-west-2:111122223333:inference-profile/\
             us.anthropic.claude-3-5-sonnet-20240620-v1:0",
        ));
}

#[test]
fn create_uses_default_version() {
    let cassette = fixtures_dir().join("create_teama.cassette.yaml");
    replay(&cassette, &["-t", "teama", "-a", "create", "-m", "claude"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""version": "3.5""#));
}

#[test]
fn use_returns_recorded_reply() {
    let cassette = fixtures_dir().join("use_teama.cassette.yaml");
    replay(
        &cassette,
        &[
            "-t",
            "teama",
            "-a",
            "use",
            "-m",
            "claude",
            "--message",
            "What is the capital of France?",
        ],
    )
    .assert()
    .success()
    .stdout(predicate::str::contains("The capital of France is Paris."))
    .stdout(predicate::str::contains(r#""total_tokens": 39"#));
}

#[test]
fn existing_record_conflicts() {
    // The `get` recorded in the use cassette returns an existing record.
    let cassette = fixtures_dir().join("use_teama.cassette.yaml");
    replay(&cassette, &["-t", "teama", "-a", "create", "-m", "claude"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Profile already exists for team teama with model claude version 3.5",
        ));
}

#[test]
fn taken_profile_name_replays_as_conflict() {
    let cassette = fixtures_dir().join("create_name_taken.cassette.yaml");
    replay(&cassette, &["-t", "teama", "-a", "create", "-m", "claude"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Profile already exists for team teama with model claude version 3.5",
        ))
        .stdout(predicate::str::contains("An unexpected error occurred").not());
}

#[test]
fn recorded_provider_error_is_redacted() {
    let cassette = fixtures_dir().join("create_throttled.cassette.yaml");
    replay(&cassette, &["-t", "teama", "-a", "create", "-m", "claude"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("An unexpected error occurred"))
        .stdout(predicate::str::contains("ThrottlingException").not())
        .stderr(predicate::str::contains("ThrottlingException"));
}

#[test]
fn delete_removes_profile_then_record() {
    let cassette = temp_cassette(
        "delete_teama",
        r#"name: delete-teama
recorded_at: "2026-03-02T18:02:40Z"
commit: test
interactions:
  - seq: 0
    port: profile_store
    method: get
    output:
      Ok:
        team_tag: teama
        model_type: claude
        version: "3.5"
        profile_id: arn:aws:bedrock:us-west-2:111122223333:application-inference-profile/k2x9q7w1m3
        model_arn: ""
  - seq: 1
    port: provisioner
    method: delete_profile
    output:
      Ok: null
  - seq: 2
    port: profile_store
    method: delete
    output:
      Ok: null
"#,
    );
    replay(&cassette, &["-t", "teama", "-a", "delete", "-m", "claude"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""deleted": true"#));
}

#[test]
fn exhausted_cassette_fails_cleanly() {
    let cassette = temp_cassette(
        "empty",
        "name: empty\nrecorded_at: \"2026-03-02T18:05:00Z\"\ncommit: test\ninteractions: []\n",
    );
    replay(&cassette, &["-t", "teama", "-a", "get", "-m", "claude"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("An unexpected error occurred"))
        .stderr(predicate::str::contains("no interactions for profile_store::get"));
}

#[test]
fn missing_cassette_is_fatal() {
    let cassette = fixtures_dir().join("nope.cassette.yaml");
    replay(&cassette, &["-t", "teama", "-a", "get", "-m", "claude"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load cassette"));
}
