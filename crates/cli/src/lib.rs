// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! obxrs - command-line front end for the offline request outbox.
//!
//! The `obx` binary opens the outbox persisted in a state directory and
//! lets you inspect it, queue requests, send requests through the
//! capture path, and replay what is queued.
//!
//! # Main Components
//!
//! - [`Config`] - API base URL, storage key and connectivity probe settings
//! - [`Cli`] - Argument parsing
//! - [`Error`] - Error types for all commands
//!
//! State lives in one directory (see [`config::resolve_state_dir`]):
//!
//! ```text
//! <state-dir>/
//!   config.toml           optional
//!   clinicq_outbox.json   queued entries (JSON array)
//!   clinicq_token.json    access token
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod env;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command, OutputFormat, RequestArgs, TokenCommand};
pub use config::Config;
pub use error::{Error, Result};

use commands::Context;

/// Run a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::open(cli.config.as_deref(), cli.state_dir.as_deref())?;

    match cli.command {
        Command::List { output } => commands::list::run(&ctx, output).await,
        Command::Status { output, offline } => commands::status::run(&ctx, output, offline).await,
        Command::Enqueue { request } => commands::request::enqueue(&ctx, &request).await,
        Command::Send { request, offline } => commands::request::send(&ctx, &request, offline).await,
        Command::Remove { id } => commands::remove::run(&ctx, &id).await,
        Command::Clear => commands::remove::clear(&ctx).await,
        Command::Replay { offline } => commands::replay::run(&ctx, offline).await,
        Command::Watch => commands::replay::watch(&ctx).await,
        Command::Token(cmd) => commands::token::run(&ctx, cmd).await,
    }
}
