// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the obx CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid method: '{0}'\n  hint: valid methods are: get, post, put, patch, delete")]
    InvalidMethod(String),

    #[error("entry not found: {0}\n  hint: run 'obx list' to see queued entries")]
    EntryNotFound(String),

    #[error("replay stopped at entry {entry_id} after {replayed} replayed: {reason}")]
    ReplayStopped {
        replayed: usize,
        entry_id: String,
        reason: String,
    },

    #[error(transparent)]
    Outbox(#[from] ob_core::Error),

    #[error(transparent)]
    Client(#[from] ob_client::ClientError),

    #[error(transparent)]
    Transport(#[from] ob_client::TransportError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
