// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI configuration management.
//!
//! Configuration is read from `config.toml` in the state directory (or the
//! file named by `--config` / `OBX_CONFIG`) and includes:
//! - `api_base_url`: server that relative request URLs are resolved against
//! - `storage_key`: key the outbox is persisted under
//! - `[http]`, `[auth]`, `[connectivity]`: transport, refresh and probe settings

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ob_client::HttpConfig;

use crate::env;
use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_DIR_NAME: &str = "obx";

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the API server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Storage key of the outbox.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub connectivity: ConnectivitySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSection {
    /// Request timeout in seconds (default: 15).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSection {
    /// Path of the token refresh endpoint.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivitySection {
    /// `host:port` probed to decide whether the network is up.
    /// Defaults to the host of `api_base_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_address: Option<String>,
    /// Probe connect timeout in milliseconds (default: 2000).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Interval between probes in `obx watch`, in milliseconds (default: 5000).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_storage_key() -> String {
    ob_core::DEFAULT_OUTBOX_KEY.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_refresh_path() -> String {
    ob_client::credentials::DEFAULT_REFRESH_PATH.to_string()
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

fn default_poll_interval_ms() -> u64 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: default_api_base_url(),
            storage_key: default_storage_key(),
            http: HttpSection::default(),
            auth: AuthSection::default(),
            connectivity: ConnectivitySection::default(),
        }
    }
}

impl Default for HttpSection {
    fn default() -> Self {
        HttpSection {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AuthSection {
    fn default() -> Self {
        AuthSection {
            refresh_path: default_refresh_path(),
        }
    }
}

impl Default for ConnectivitySection {
    fn default() -> Self {
        ConnectivitySection {
            probe_address: None,
            probe_timeout_ms: default_probe_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Load configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Load the configuration that applies to `state_dir`.
    ///
    /// An explicit path (flag, then `OBX_CONFIG`) must exist. The default
    /// `config.toml` in the state directory is optional.
    pub fn resolve(explicit: Option<&Path>, state_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit.map(Path::to_path_buf).or_else(env::config_path) {
            return Self::load(&path);
        }
        let default_path = state_dir.join(CONFIG_FILE_NAME);
        if default_path.is_file() {
            Self::load(&default_path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_secs(self.http.timeout_secs),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.connectivity.probe_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.connectivity.poll_interval_ms.max(1))
    }

    /// Returns the `host:port` to probe for connectivity.
    pub fn probe_address(&self) -> Result<String> {
        if let Some(address) = &self.connectivity.probe_address {
            return Ok(address.clone());
        }
        host_port(&self.api_base_url).ok_or_else(|| {
            Error::Config(format!(
                "cannot derive probe address from api_base_url '{}'\n  hint: set connectivity.probe_address",
                self.api_base_url
            ))
        })
    }
}

/// Extracts `host:port` from an http(s) URL, filling in the scheme's port.
pub(crate) fn host_port(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let default_port = match scheme {
        "http" => 80,
        "https" => 443,
        _ => return None,
    };
    let authority = rest.split(['/', '?', '#']).next()?;
    let authority = authority.rsplit('@').next()?;
    if authority.is_empty() {
        return None;
    }
    let has_port = if authority.starts_with('[') {
        authority.contains("]:")
    } else {
        authority.contains(':')
    };
    if has_port {
        Some(authority.to_string())
    } else {
        Some(format!("{authority}:{default_port}"))
    }
}

/// Resolve the state directory holding the outbox, tokens and config.
///
/// Order: explicit flag, `OBX_STATE_DIR`, `$XDG_STATE_HOME/obx`, then the
/// platform state or local data directory.
pub fn resolve_state_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env::state_dir() {
        return Ok(dir);
    }
    if let Some(dir) = env::xdg_state_home() {
        return Ok(dir.join(STATE_DIR_NAME));
    }
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join(STATE_DIR_NAME))
        .ok_or_else(|| Error::Config("cannot determine state directory\n  hint: pass --state-dir".to_string()))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
