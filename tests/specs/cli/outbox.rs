// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for queue inspection and capture: `obx list`, `enqueue`, `send`,
//! `remove`, `clear`, `status` and `replay`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn obx(state: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("obx");
    cmd.arg("--state-dir")
        .arg(state.path())
        .env_remove("OBX_CONFIG")
        .env_remove("OBX_STATE_DIR")
        .env_remove("OBX_LOG");
    cmd
}

/// State directory whose API points at a port nothing listens on.
fn unreachable_state() -> TempDir {
    let state = TempDir::new().unwrap();
    std::fs::write(
        state.path().join("config.toml"),
        "api_base_url = \"http://127.0.0.1:9\"\n\n[http]\ntimeout_secs = 2\n",
    )
    .unwrap();
    state
}

fn enqueue(state: &TempDir, method: &str, url: &str) -> String {
    let output = obx(state)
        .args(["enqueue", method, url])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .trim()
        .strip_prefix("Queued ")
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap()
        .to_string()
}

fn list_json(state: &TempDir) -> Vec<Value> {
    let output = obx(state).args(["list", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

// =============================================================================
// list / enqueue
// =============================================================================

#[test]
fn list_empty_outbox() {
    let state = TempDir::new().unwrap();
    obx(&state)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No queued requests"));
}

#[test]
fn enqueue_then_list_shows_entry() {
    let state = TempDir::new().unwrap();
    let id = enqueue(&state, "post", "/api/patients/");

    obx(&state)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(&id))
        .stdout(predicate::str::contains("POST /api/patients/"));
}

#[test]
fn list_preserves_enqueue_order() {
    let state = TempDir::new().unwrap();
    let first = enqueue(&state, "post", "/api/patients/");
    let second = enqueue(&state, "patch", "/api/patients/1/");

    let entries = list_json(&state);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], first.as_str());
    assert_eq!(entries[1]["id"], second.as_str());
    assert_eq!(entries[1]["method"], "patch");
}

#[test]
fn enqueue_json_body_is_stored() {
    let state = TempDir::new().unwrap();
    obx(&state)
        .args(["enqueue", "post", "/api/patients/", "--data", r#"{"name":"Alice"}"#])
        .args(["-H", "X-Request-Id: abc"])
        .assert()
        .success();

    let entries = list_json(&state);
    assert_eq!(entries[0]["body"]["name"], "Alice");
    assert_eq!(entries[0]["headers"]["X-Request-Id"], "abc");
    assert_eq!(entries[0]["attempt"], 0);
    assert!(entries[0]["createdAt"].is_string());
}

#[test]
fn enqueue_fields_are_stored_as_form_data() {
    let state = TempDir::new().unwrap();
    obx(&state)
        .args(["enqueue", "post", "/api/uploads/", "--field", "visit=42"])
        .assert()
        .success();

    let entries = list_json(&state);
    assert_eq!(entries[0]["body"]["__type"], "FormData");
}

#[test]
fn enqueue_rejects_get() {
    let state = TempDir::new().unwrap();
    obx(&state)
        .args(["enqueue", "get", "/api/patients/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid method"));
}

#[test]
fn enqueue_rejects_invalid_json() {
    let state = TempDir::new().unwrap();
    obx(&state)
        .args(["enqueue", "post", "/api/patients/", "--data", "{oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--data is not valid JSON"));
}

#[test]
fn data_conflicts_with_field() {
    let state = TempDir::new().unwrap();
    obx(&state)
        .args(["enqueue", "post", "/api/x/", "--data", "{}", "--field", "a=b"])
        .assert()
        .failure();
}

// =============================================================================
// remove / clear
// =============================================================================

#[test]
fn remove_deletes_only_that_entry() {
    let state = TempDir::new().unwrap();
    let first = enqueue(&state, "post", "/api/a/");
    let second = enqueue(&state, "post", "/api/b/");

    obx(&state)
        .args(["remove", &first])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Removed {first}")));

    let entries = list_json(&state);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], second.as_str());
}

#[test]
fn remove_unknown_id_fails_with_hint() {
    let state = TempDir::new().unwrap();
    obx(&state)
        .args(["remove", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("entry not found: nope"))
        .stderr(predicate::str::contains("obx list"));
}

#[test]
fn clear_empties_outbox() {
    let state = TempDir::new().unwrap();
    enqueue(&state, "post", "/api/a/");
    enqueue(&state, "delete", "/api/b/1/");

    obx(&state)
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 queued request(s)"));
    assert!(list_json(&state).is_empty());
}

// =============================================================================
// status
// =============================================================================

#[test]
fn status_offline_with_nothing_queued() {
    let state = TempDir::new().unwrap();
    obx(&state)
        .args(["status", "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline mode · showing cached data"))
        .stdout(predicate::str::contains("queued").not());
}

#[test]
fn status_offline_counts_queued_updates() {
    let state = TempDir::new().unwrap();
    enqueue(&state, "post", "/api/a/");
    enqueue(&state, "post", "/api/b/");

    obx(&state)
        .args(["status", "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Offline mode · showing cached data · 2 updates queued",
        ))
        .stdout(predicate::str::contains("Last update queued"));
}

#[test]
fn status_json_reports_counts() {
    let state = TempDir::new().unwrap();
    enqueue(&state, "put", "/api/a/1/");

    let output = obx(&state)
        .args(["status", "--offline", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"]["pendingCount"], 1);
    assert_eq!(report["status"]["hasPending"], true);
    assert_eq!(report["network"]["isConnected"], false);
    assert_eq!(report["bannerVisible"], true);
}

// =============================================================================
// send / replay
// =============================================================================

#[test]
fn send_without_response_while_offline_is_queued() {
    let state = unreachable_state();
    obx(&state)
        .args(["send", "post", "/api/patients/", "--data", r#"{"name":"Bob"}"#, "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Offline: queued "))
        .stdout(predicate::str::contains("POST /api/patients/"));

    let entries = list_json(&state);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["body"]["name"], "Bob");
}

#[test]
fn send_get_while_offline_is_not_queued() {
    let state = unreachable_state();
    obx(&state)
        .args(["send", "get", "/api/patients/", "--offline"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no response from server"));
    assert!(list_json(&state).is_empty());
}

#[test]
fn replay_while_offline_keeps_entries() {
    let state = unreachable_state();
    enqueue(&state, "post", "/api/a/");

    obx(&state)
        .args(["replay", "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline: 1 request(s) still queued"));
    assert_eq!(list_json(&state).len(), 1);
}

#[test]
fn replay_skips_when_probe_cannot_connect() {
    let state = TempDir::new().unwrap();
    std::fs::write(
        state.path().join("config.toml"),
        "api_base_url = \"http://127.0.0.1:9\"\n\n[connectivity]\nprobe_address = \"127.0.0.1:9\"\nprobe_timeout_ms = 200\n",
    )
    .unwrap();

    // An unreachable probe reports offline, so nothing is attempted.
    obx(&state)
        .arg("replay")
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline: 0 request(s) still queued"));
}
