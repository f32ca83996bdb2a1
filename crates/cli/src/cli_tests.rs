// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use clap::CommandFactory;

#[test]
fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["obx", "list", "--state-dir", "/tmp/s", "-v"]).unwrap();
    assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/s")));
    assert!(cli.verbose);
    assert!(matches!(cli.command, Command::List { output: OutputFormat::Text }));
}

#[test]
fn test_send_parses_request_args() {
    let cli = Cli::try_parse_from([
        "obx", "send", "post", "/api/patients/", "--data", "{}", "-H", "X-A: 1", "--offline",
    ])
    .unwrap();
    let Command::Send { request, offline } = cli.command else {
        panic!("expected send");
    };
    assert!(offline);
    assert_eq!(request.method, "post");
    assert_eq!(request.url, "/api/patients/");
    assert_eq!(request.data.as_deref(), Some("{}"));
    assert_eq!(request.headers, vec!["X-A: 1".to_string()]);
}

#[test]
fn test_data_conflicts_with_fields() {
    let result = Cli::try_parse_from(["obx", "enqueue", "post", "/x", "--data", "{}", "--field", "a=b"]);
    assert!(result.is_err());
}

#[test]
fn test_token_set_with_refresh() {
    let cli = Cli::try_parse_from(["obx", "token", "set", "abc", "--refresh", "def"]).unwrap();
    let Command::Token(TokenCommand::Set { access, refresh }) = cli.command else {
        panic!("expected token set");
    };
    assert_eq!(access, "abc");
    assert_eq!(refresh.as_deref(), Some("def"));
}

#[test]
fn test_status_json_output() {
    let cli = Cli::try_parse_from(["obx", "status", "-o", "json"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Status { output: OutputFormat::Json, offline: false }
    ));
}
