// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network reachability as seen by the client.

use std::sync::Arc;
use std::time::Duration;

use ob_core::BoxFuture;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Last known network state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkState {
    pub is_connected: bool,
    /// `None` when reachability has not been determined.
    pub is_internet_reachable: Option<bool>,
}

impl NetworkState {
    pub const ONLINE: NetworkState = NetworkState {
        is_connected: true,
        is_internet_reachable: Some(true),
    };

    pub const OFFLINE: NetworkState = NetworkState {
        is_connected: false,
        is_internet_reachable: Some(false),
    };

    /// Offline if disconnected, or connected without internet access.
    pub fn is_offline(&self) -> bool {
        !self.is_connected || self.is_internet_reachable == Some(false)
    }
}

/// Source of network state.
pub trait Connectivity: Send + Sync {
    /// Determines the current state.
    fn fetch(&self) -> BoxFuture<'_, NetworkState>;

    /// Returns a receiver notified whenever the state changes.
    ///
    /// Dropping the receiver unsubscribes.
    fn subscribe(&self) -> watch::Receiver<NetworkState>;
}

/// Connectivity driven by the host: platform callbacks, tests, CLI flags.
#[derive(Debug)]
pub struct ManualConnectivity {
    sender: watch::Sender<NetworkState>,
}

impl ManualConnectivity {
    pub fn new(initial: NetworkState) -> Self {
        ManualConnectivity {
            sender: watch::Sender::new(initial),
        }
    }

    pub fn online() -> Self {
        Self::new(NetworkState::ONLINE)
    }

    pub fn offline() -> Self {
        Self::new(NetworkState::OFFLINE)
    }

    /// Publishes `state`; subscribers are only woken by actual changes.
    pub fn set(&self, state: NetworkState) {
        self.sender.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    pub fn set_connected(&self, connected: bool) {
        self.set(if connected { NetworkState::ONLINE } else { NetworkState::OFFLINE });
    }

    pub fn current(&self) -> NetworkState {
        *self.sender.borrow()
    }
}

impl Connectivity for ManualConnectivity {
    fn fetch(&self) -> BoxFuture<'_, NetworkState> {
        let state = self.current();
        Box::pin(async move { state })
    }

    fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.sender.subscribe()
    }
}

/// Connectivity determined by opening a TCP connection to a known address.
#[derive(Debug)]
pub struct ProbeConnectivity {
    address: String,
    timeout: Duration,
    sender: watch::Sender<NetworkState>,
}

impl ProbeConnectivity {
    /// Creates a probe for `address` (`host:port`). Starts out assumed online
    /// until the first probe.
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        ProbeConnectivity {
            address: address.into(),
            timeout,
            sender: watch::Sender::new(NetworkState::ONLINE),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn probe(&self) -> NetworkState {
        let connected = matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(&self.address)).await,
            Ok(Ok(_))
        );
        debug!(address = %self.address, connected, "connectivity probe");
        NetworkState {
            is_connected: connected,
            is_internet_reachable: Some(connected),
        }
    }

    fn publish(&self, state: NetworkState) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
        if changed {
            info!(address = %self.address, connected = state.is_connected, "network state changed");
        }
    }

    /// Probes every `interval` until `cancel` fires.
    pub fn spawn_monitor(self: &Arc<Self>, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let probe = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        let state = probe.probe().await;
                        probe.publish(state);
                    }
                }
            }
        })
    }
}

impl Connectivity for ProbeConnectivity {
    fn fetch(&self) -> BoxFuture<'_, NetworkState> {
        Box::pin(async move {
            let state = self.probe().await;
            self.publish(state);
            state
        })
    }

    fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
