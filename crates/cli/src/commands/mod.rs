// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod list;
pub mod remove;
pub mod replay;
pub mod request;
pub mod status;
pub mod token;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ob_client::{
    Connectivity, HttpTransport, ManualConnectivity, ProbeConnectivity, ReplayEngine, SessionCredentials,
};
use ob_core::{FileStore, Outbox};
use tracing::debug;

use crate::config::{resolve_state_dir, Config};
use crate::error::Result;

/// Everything a command needs: configuration and the persisted outbox.
pub struct Context {
    pub config: Config,
    pub state_dir: PathBuf,
    pub store: Arc<FileStore>,
    pub outbox: Outbox,
}

impl Context {
    /// Resolve the state directory and config, and open the outbox there.
    pub fn open(config_path: Option<&Path>, state_dir: Option<&Path>) -> Result<Self> {
        let state_dir = resolve_state_dir(state_dir)?;
        let config = Config::resolve(config_path, &state_dir)?;
        let store = Arc::new(FileStore::open(&state_dir)?);
        let outbox = Outbox::builder(store.clone())
            .key(config.storage_key.clone())
            .build();
        debug!(state_dir = %store.dir().display(), key = %config.storage_key, "opened outbox");

        Ok(Context {
            config,
            state_dir,
            store,
            outbox,
        })
    }

    pub fn transport(&self) -> Result<Arc<HttpTransport>> {
        Ok(Arc::new(HttpTransport::new(&self.config.http_config())?))
    }

    pub fn credentials(&self, transport: Arc<HttpTransport>) -> Arc<SessionCredentials> {
        Arc::new(
            SessionCredentials::new(self.store.clone(), transport)
                .with_refresh_path(self.config.auth.refresh_path.clone()),
        )
    }

    /// Connectivity source: a TCP probe, or a fixed offline state.
    pub fn connectivity(&self, offline: bool) -> Result<Arc<dyn Connectivity>> {
        let connectivity: Arc<dyn Connectivity> = if offline {
            Arc::new(ManualConnectivity::offline())
        } else {
            self.probe()?
        };
        Ok(connectivity)
    }

    pub fn probe(&self) -> Result<Arc<ProbeConnectivity>> {
        Ok(Arc::new(ProbeConnectivity::new(
            self.config.probe_address()?,
            self.config.probe_timeout(),
        )))
    }

    pub fn replay_engine(&self) -> Result<Arc<ReplayEngine>> {
        let transport = self.transport()?;
        let credentials = self.credentials(transport.clone());
        Ok(Arc::new(ReplayEngine::new(self.outbox.clone(), transport, credentials)))
    }
}
