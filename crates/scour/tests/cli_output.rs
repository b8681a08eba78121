//! Integration tests for CLI output behavior
//!
//! The default behavior is quiet (no logs). Use -v/--verbose to enable logs.

use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

fn scour(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scour"))
        .args(args)
        // Keep user and project config files out of the picture
        .env("HOME", env!("CARGO_TARGET_TMPDIR"))
        .current_dir(env!("CARGO_TARGET_TMPDIR"))
        .output()
        .expect("Failed to execute scour")
}

fn fixture(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const CLOUD: &str = r#"{
  "user_id": "u1",
  "services": {
    "keystone": {
      "collections": {
        "projects": [{"id": "t1", "name": "demo"}]
      }
    },
    "nova": {
      "collections": {
        "servers": [
          {"id": "s1", "name": "vm-1", "project_id": "t1"},
          {"id": "s2", "name": "vm-2", "project_id": "t2"}
        ]
      }
    },
    "cinder": {
      "collections": {
        "volumes": [{"id": "v1", "name": "vol-1", "project_id": "t1"}]
      }
    }
  }
}"#;

#[test]
fn test_kinds_stdout_is_clean() {
    let output = scour(&["kinds"]);
    assert!(
        output.status.success(),
        "scour kinds failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("nova.servers"));
    assert!(stdout.contains("keystone.project"));
    assert!(
        !stdout.contains(r#""event":"#),
        "stdout should not contain JSON logs, got: {}",
        stdout
    );
    assert!(
        !stderr.contains(r#""level":"INFO""#),
        "Default mode should not emit INFO logs, got: {}",
        stderr
    );
}

#[test]
fn test_kinds_json_in_deletion_order() {
    let output = scour(&["kinds", "--json", "--service", "neutron"]);
    assert!(output.status.success());

    let kinds: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let kinds = kinds.as_array().unwrap();
    assert!(!kinds.is_empty());
    assert!(kinds.iter().all(|k| k["service"] == "neutron"));

    let orders: Vec<u64> = kinds.iter().map(|k| k["order"].as_u64().unwrap()).collect();
    let mut sorted = orders.clone();
    sorted.sort();
    assert_eq!(orders, sorted);
}

#[test]
fn test_verbose_emits_json_logs_on_stderr() {
    let output = scour(&["-v", "kinds"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("core.app.startup_completed"),
        "Verbose mode should log startup, got: {}",
        stderr
    );
}

#[test]
fn test_run_reports_json() {
    let cloud = fixture(CLOUD);
    let path = cloud.path().to_str().unwrap();
    let output = scour(&[
        "run", "--fixture", path, "--tenant", "t1", "--service", "nova", "--service", "cinder",
        "--json",
    ]);
    assert!(
        output.status.success(),
        "scour run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["cancelled"], false);
    let kinds = report["kinds"].as_array().unwrap();
    let servers = kinds
        .iter()
        .find(|k| k["service"] == "nova" && k["resource"] == "servers")
        .unwrap();
    assert_eq!(servers["status"], "completed");
    assert_eq!(servers["counts"]["deleted"], 1);
    assert_eq!(servers["resources"][0]["id"], "s1");
}

#[test]
fn test_run_user_only_skips_admin_kinds() {
    let cloud = fixture(CLOUD);
    let path = cloud.path().to_str().unwrap();
    let output = scour(&[
        "run", "--fixture", path, "--tenant", "t1", "--user", "--service", "nova", "--json",
    ]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let flavors = report["kinds"]
        .as_array()
        .unwrap()
        .iter()
        .find(|k| k["resource"] == "flavors")
        .unwrap();
    assert_eq!(flavors["status"], "skipped");
    assert_eq!(flavors["reason"], "requires an admin identity");
}

#[test]
fn test_run_table_output() {
    let cloud = fixture(CLOUD);
    let path = cloud.path().to_str().unwrap();
    let output = scour(&["run", "--fixture", path, "--tenant", "t1", "--service", "cinder"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cinder.volumes"));
    assert!(stdout.contains("Deleted: 1"));
    for line in stdout.lines() {
        assert!(!line.trim_start().starts_with('{'), "unexpected JSON line: {line}");
    }
}

#[test]
fn test_run_missing_fixture_fails() {
    let output = scour(&[
        "run",
        "--fixture",
        "/nonexistent/cloud.json",
        "--tenant",
        "t1",
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_run_unknown_service_fails() {
    let cloud = fixture(CLOUD);
    let path = cloud.path().to_str().unwrap();
    let output = scour(&["run", "--fixture", path, "--service", "nope"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nope"), "stderr should name the kind: {stderr}");
}
