// ABOUTME: Integration tests for the dockscout CLI commands.
// ABOUTME: Validates --help output and the offline status command.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn dockscout_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dockscout"));
    for var in [
        "DATA_DIR",
        "DOCKER_SOCKET",
        "COMPOSE_MOUNTS",
        "LOCAL_REFRESH_HOURS",
        "UPDATE_INTERVAL_MINUTES",
        "UPDATE_BATCH_SIZE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

const STATE: &str = r#"{
  "images": [
    {
      "id": "docker.io/nginx|1.25|sha256:aaaa|web|proxy",
      "repo": "nginx",
      "registry": "docker.io",
      "tag": "1.25",
      "digest": "sha256:aaaaaaaaaaaaaaaaaaaa",
      "displayName": "nginx",
      "source": "compose",
      "stack": "web",
      "composeFile": "/srv/web/compose.yml",
      "service": "proxy",
      "status": "running",
      "lastSeen": "2026-01-01T00:00:00Z",
      "lastUpdateCheck": "2026-01-01T01:00:00Z",
      "updateAvailable": true,
      "updateMessage": "digest changed"
    }
  ],
  "lastRefresh": "2026-01-01T00:00:00Z"
}"#;

#[test]
fn help_shows_commands() {
    dockscout_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("refresh"))
        .stdout(predicate::str::contains("check-stack"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn status_with_no_state_is_empty() {
    let temp_dir = tempfile::tempdir().unwrap();

    dockscout_cmd()
        .current_dir(temp_dir.path())
        .env("DATA_DIR", temp_dir.path().join("data"))
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 image(s)"));
}

#[test]
fn status_renders_stored_records() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("db.json"), STATE).unwrap();
    fs::write(
        temp_dir.path().join("dockscout.yml"),
        format!("data_dir: {}\n", temp_dir.path().display()),
    )
    .unwrap();

    dockscout_cmd()
        .current_dir(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("web"))
        .stdout(predicate::str::contains("proxy: nginx"))
        .stdout(predicate::str::contains("aaaaa...aaaaa"))
        .stdout(predicate::str::contains("update available"))
        .stdout(predicate::str::contains("https://hub.docker.com/r/library/nginx"));
}

#[test]
fn status_json_emits_snapshot() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("db.json"), STATE).unwrap();

    let output = dockscout_cmd()
        .current_dir(temp_dir.path())
        .env("DATA_DIR", temp_dir.path())
        .args(["status", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["images"][0]["service"], "proxy");
    assert_eq!(json["images"][0]["updateAvailable"], true);
}

#[test]
fn corrupt_state_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("db.json"), "{").unwrap();

    dockscout_cmd()
        .current_dir(temp_dir.path())
        .env("DATA_DIR", temp_dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid"));
}

#[test]
fn invalid_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("dockscout.yml"), "batch_size: lots\n").unwrap();

    dockscout_cmd()
        .current_dir(temp_dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("YAML"));
}
