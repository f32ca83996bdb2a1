// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `OBX_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    non_empty(vars::OBX_CONFIG).map(PathBuf::from)
}

/// Returns the value of `OBX_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    non_empty(vars::OBX_STATE_DIR).map(PathBuf::from)
}

/// Returns the value of `OBX_LOG` if set.
pub fn log_filter() -> Option<String> {
    non_empty(vars::OBX_LOG)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    non_empty(vars::XDG_STATE_HOME).map(PathBuf::from)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
