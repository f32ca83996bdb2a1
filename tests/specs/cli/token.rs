// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `obx token`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn obx(state: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("obx");
    cmd.arg("--state-dir")
        .arg(state.path())
        .env_remove("OBX_CONFIG")
        .env_remove("OBX_STATE_DIR");
    cmd
}

fn read_key(state: &TempDir, file: &str) -> Option<String> {
    std::fs::read_to_string(state.path().join(file)).ok()
}

#[test]
fn token_set_stores_access_token() {
    let state = TempDir::new().unwrap();
    obx(&state)
        .args(["token", "set", "abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored access token"));

    assert_eq!(read_key(&state, "clinicq_token.json").as_deref(), Some("abc"));
}

#[test]
fn token_set_with_refresh_stores_both() {
    let state = TempDir::new().unwrap();
    obx(&state)
        .args(["token", "set", "abc", "--refresh", "r1"])
        .assert()
        .success();

    assert_eq!(read_key(&state, "clinicq_token.json").as_deref(), Some("abc"));
    assert_eq!(read_key(&state, "clinicq_refresh-token.json").as_deref(), Some("r1"));
}

#[test]
fn token_clear_forgets_tokens() {
    let state = TempDir::new().unwrap();
    obx(&state)
        .args(["token", "set", "abc", "--refresh", "r1"])
        .assert()
        .success();

    obx(&state)
        .args(["token", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared stored tokens"));

    assert_eq!(read_key(&state, "clinicq_token.json"), None);
    assert_eq!(read_key(&state, "clinicq_refresh-token.json"), None);
}

#[test]
fn token_set_requires_value() {
    let state = TempDir::new().unwrap();
    obx(&state).args(["token", "set"]).assert().failure();
}
