// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  obx status                         Show pending updates and sync state
  obx send post /api/patients/ --data '{\"name\":\"Alice\"}'
                                     Send a request, queuing it when offline
  obx list                           List queued requests
  obx replay                         Replay queued requests now";

#[derive(Parser, Debug)]
#[command(name = "obx", version)]
#[command(about = "Inspect and replay the offline request outbox")]
#[command(
    long_about = "Inspect and replay the offline request outbox.\n\n\
    Requests that cannot reach the server while the device is offline are queued \
    and replayed in order once connectivity returns."
)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Config file (default: <state-dir>/config.toml)
    #[arg(long, short = 'c', global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the outbox, tokens and config
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List queued requests in replay order
    List {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show pending count and sync state
    Status {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,

        /// Assume the network is down instead of probing
        #[arg(long)]
        offline: bool,
    },

    /// Queue a request without attempting to send it
    #[command(after_help = "Examples:\n  \
        obx enqueue post /api/patients/ --data '{\"name\":\"Alice\"}'\n  \
        obx enqueue post /api/uploads/ --field visit=42 --file scan=./scan.jpg\n  \
        obx enqueue delete /api/visits/7/ -H 'X-Request-Id: abc'")]
    Enqueue {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Send a request, queuing it if it gets no response while offline
    Send {
        #[command(flatten)]
        request: RequestArgs,

        /// Assume the network is down instead of probing
        #[arg(long)]
        offline: bool,
    },

    /// Remove a queued request
    Remove {
        /// Entry ID
        id: String,
    },

    /// Remove all queued requests
    Clear,

    /// Replay queued requests once
    Replay {
        /// Assume the network is down instead of probing
        #[arg(long)]
        offline: bool,
    },

    /// Replay on startup and whenever connectivity returns, until Ctrl-C
    Watch,

    /// Manage stored credentials
    #[command(subcommand)]
    Token(TokenCommand),
}

/// Request description shared by `enqueue` and `send`.
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// HTTP method (post, put, patch, delete; send also accepts get)
    pub method: String,

    /// URL, absolute or relative to api_base_url
    pub url: String,

    /// JSON body
    #[arg(long, short = 'd', conflicts_with_all = ["field", "file"])]
    pub data: Option<String>,

    /// Multipart text field as name=value (repeatable)
    #[arg(long, short = 'F', value_name = "NAME=VALUE")]
    pub field: Vec<String>,

    /// Multipart file field as name=path (repeatable)
    #[arg(long, value_name = "NAME=PATH")]
    pub file: Vec<String>,

    /// Header as 'Name: value' (repeatable)
    #[arg(long = "header", short = 'H', value_name = "HEADER")]
    pub headers: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Store an access token (and optionally a refresh token)
    Set {
        access: String,

        #[arg(long)]
        refresh: Option<String>,
    },

    /// Forget stored tokens
    Clear,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
