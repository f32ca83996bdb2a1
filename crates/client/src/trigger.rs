// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Decides when to drain the outbox.
//!
//! A drain is attempted once at start, whenever connectivity changes to
//! connected, and whenever the application returns to the
//! foreground. Each attempt first checks that the device is connected.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connectivity::Connectivity;
use crate::replay::{DrainOutcome, ReplayEngine};

/// Lifecycle state reported by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Active,
    Inactive,
    Background,
}

/// What caused a drain attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    Startup,
    Reconnected,
    Foreground,
    Manual,
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerReason::Startup => "startup",
            TriggerReason::Reconnected => "reconnected",
            TriggerReason::Foreground => "foreground",
            TriggerReason::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// Runs drains in response to triggers.
#[derive(Clone)]
pub struct ReplayTrigger {
    engine: Arc<ReplayEngine>,
    connectivity: Arc<dyn Connectivity>,
}

impl ReplayTrigger {
    pub fn new(engine: Arc<ReplayEngine>, connectivity: Arc<dyn Connectivity>) -> Self {
        ReplayTrigger { engine, connectivity }
    }

    pub fn engine(&self) -> &Arc<ReplayEngine> {
        &self.engine
    }

    /// Drains if currently connected.
    ///
    /// Returns `None` when offline. Failures are logged, never returned.
    pub async fn fire(&self, reason: TriggerReason) -> Option<DrainOutcome> {
        let state = self.connectivity.fetch().await;
        if !state.is_connected {
            debug!(%reason, "offline, skipping replay");
            return None;
        }

        let outcome = self.engine.drain().await;
        match &outcome {
            DrainOutcome::Drained { replayed } if *replayed > 0 => {
                info!(%reason, replayed, "outbox drained");
            }
            DrainOutcome::Drained { .. } => debug!(%reason, "outbox empty"),
            DrainOutcome::Stopped { replayed, entry_id, error } => {
                warn!(%reason, replayed, entry = %entry_id, %error, "replay stopped");
            }
            DrainOutcome::AlreadyDraining => debug!(%reason, "replay already running"),
        }
        Some(outcome)
    }

    /// Starts listening for triggers in a background task.
    ///
    /// `app_states` carries lifecycle changes from the host. The task ends
    /// when the handle is shut down or dropped.
    pub fn spawn(self, mut app_states: mpsc::Receiver<AppState>) -> TriggerHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut network = self.connectivity.subscribe();
            network.borrow_and_update();

            // Changes published during this drain stay unseen and are handled
            // by the loop afterwards.
            self.fire(TriggerReason::Startup).await;
            let mut app_states_open = true;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = network.changed() => {
                        if changed.is_err() {
                            debug!("connectivity source closed");
                            break;
                        }
                        // Sources publish only real changes, and the channel
                        // keeps just the latest value: a connected value here
                        // means the device came back, possibly more than once.
                        if network.borrow_and_update().is_connected {
                            self.fire(TriggerReason::Reconnected).await;
                        }
                    }
                    state = app_states.recv(), if app_states_open => match state {
                        Some(AppState::Active) => {
                            self.fire(TriggerReason::Foreground).await;
                        }
                        Some(_) => {}
                        None => app_states_open = false,
                    },
                }
            }
        });

        TriggerHandle { cancel, task: Some(task) }
    }
}

/// Handle to a running trigger task. Dropping it stops the task.
#[derive(Debug)]
pub struct TriggerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TriggerHandle {
    /// Stops the task and waits for it to finish.
    ///
    /// A drain in progress is completed first.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "replay trigger task failed");
            }
        }
    }
}

impl Drop for TriggerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
