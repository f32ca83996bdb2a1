// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replays queued mutations in order.
//!
//! A drain takes one snapshot of the outbox and sends each entry in turn
//! with a fresh credential. An entry is removed only after the server
//! accepted it. The first failure ends the drain and leaves that entry and
//! everything after it queued for the next drain.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ob_core::{Outbox, OutboxEntry};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use tracing::{debug, error, info, warn};

use crate::credentials::CredentialProvider;
use crate::transport::{ApiRequest, Transport, TransportError};

/// Why a drain stopped early.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReplayError {
    /// Sending the entry failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The entry was delivered but could not be removed from the outbox.
    #[error("delivered but not removed: {0}")]
    Remove(String),
}

/// Result of one drain.
#[derive(Debug, Clone)]
pub enum DrainOutcome {
    /// Every entry in the snapshot was delivered and removed.
    Drained { replayed: usize },
    /// Delivery stopped at `entry_id`.
    Stopped {
        replayed: usize,
        entry_id: String,
        error: ReplayError,
    },
    /// Another drain was already running; nothing was done.
    AlreadyDraining,
}

impl DrainOutcome {
    /// Number of entries delivered and removed.
    pub fn replayed(&self) -> usize {
        match self {
            DrainOutcome::Drained { replayed } | DrainOutcome::Stopped { replayed, .. } => *replayed,
            DrainOutcome::AlreadyDraining => 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, DrainOutcome::Drained { .. })
    }
}

/// Delivers outbox entries through a transport.
pub struct ReplayEngine {
    outbox: Outbox,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    draining: AtomicBool,
}

impl ReplayEngine {
    pub fn new(outbox: Outbox, transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialProvider>) -> Self {
        ReplayEngine {
            outbox,
            transport,
            credentials,
            draining: AtomicBool::new(false),
        }
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Replays the outbox once.
    ///
    /// Returns [`DrainOutcome::AlreadyDraining`] immediately if a drain is in
    /// progress on this engine.
    pub async fn drain(&self) -> DrainOutcome {
        if self
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("drain already in progress");
            return DrainOutcome::AlreadyDraining;
        }
        let _guard = DrainGuard(&self.draining);

        let entries = self.outbox.list().await;
        if entries.is_empty() {
            return DrainOutcome::Drained { replayed: 0 };
        }
        debug!(pending = entries.len(), "replaying outbox");

        let mut replayed = 0;
        for entry in entries {
            if let Err(error) = self.replay_entry(&entry).await {
                error!(id = %entry.id, url = %entry.url, error = %error, "failed to replay outbox entry");
                return DrainOutcome::Stopped {
                    replayed,
                    entry_id: entry.id,
                    error,
                };
            }
            replayed += 1;
        }
        DrainOutcome::Drained { replayed }
    }

    async fn replay_entry(&self, entry: &OutboxEntry) -> Result<(), ReplayError> {
        let mut request = self.build_request(entry)?;
        if let Some(token) = self.credentials.token().await {
            request.set_bearer(&token)?;
        }

        self.transport.execute(request).await?;

        match self.outbox.remove(&entry.id).await {
            Ok(_) => {
                info!(id = %entry.id, url = %entry.url, "replayed outbox entry");
                Ok(())
            }
            Err(e) => Err(ReplayError::Remove(e.to_string())),
        }
    }

    fn build_request(&self, entry: &OutboxEntry) -> Result<ApiRequest, TransportError> {
        let method = Method::from_bytes(entry.method.http_name().as_bytes())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let mut request = ApiRequest::new(method, entry.url.as_str()).body(entry.decoded_body());

        for (name, value) in entry.headers.iter().flatten() {
            let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) else {
                warn!(id = %entry.id, header = %name, "dropping unusable stored header");
                continue;
            };
            // Stored credentials may be stale.
            if name == AUTHORIZATION {
                continue;
            }
            request.headers.insert(name, value);
        }
        Ok(request)
    }
}

struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
