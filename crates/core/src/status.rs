// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Observable summary of the outbox for presentation layers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::clock::Clock;
use crate::entry::OutboxEntry;
use crate::outbox::{Outbox, Subscription};

/// Snapshot of the outbox as a status banner sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxStatus {
    pub entries: Vec<OutboxEntry>,
    pub pending_count: usize,
    pub has_pending: bool,
    /// Latest `createdAt` among pending entries.
    pub last_queued_at: Option<DateTime<Utc>>,
    /// Last time the outbox was observed empty.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl OutboxStatus {
    /// Derives a status from `entries`.
    ///
    /// `last_synced_at` is carried over from `previous` unless the list is
    /// empty, in which case it becomes `now`.
    pub fn from_entries(
        entries: Vec<OutboxEntry>,
        previous: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let last_queued_at = entries.iter().map(|entry| entry.created_at).max();
        let last_synced_at = if entries.is_empty() { Some(now) } else { previous };
        Self {
            pending_count: entries.len(),
            has_pending: !entries.is_empty(),
            last_queued_at,
            last_synced_at,
            entries,
        }
    }
}

/// Keeps an [`OutboxStatus`] current by listening to an [`Outbox`].
#[derive(Debug)]
pub struct StatusProjection {
    sender: Arc<watch::Sender<OutboxStatus>>,
    _subscription: Subscription,
}

impl StatusProjection {
    /// Subscribes to `outbox`, then loads its current list.
    ///
    /// If a change notification arrives while the initial list is loading,
    /// the notification wins and the initial load is discarded.
    pub async fn attach(outbox: &Outbox) -> Self {
        let clock = outbox.clock();
        let sender = Arc::new(watch::Sender::new(OutboxStatus::default()));
        let updated = Arc::new(AtomicBool::new(false));

        let subscription = {
            let sender = Arc::clone(&sender);
            let updated = Arc::clone(&updated);
            let clock = Arc::clone(&clock);
            outbox.subscribe(move |entries| {
                sender.send_modify(|status| {
                    updated.store(true, Ordering::SeqCst);
                    *status = project(status, entries.to_vec(), clock.as_ref());
                });
            })
        };

        let initial = outbox.list().await;
        sender.send_if_modified(|status| {
            if updated.load(Ordering::SeqCst) {
                return false;
            }
            *status = project(status, initial, clock.as_ref());
            true
        });

        Self { sender, _subscription: subscription }
    }

    /// Returns the latest status.
    pub fn current(&self) -> OutboxStatus {
        self.sender.borrow().clone()
    }

    /// Returns a receiver that observes every status change.
    pub fn watch(&self) -> watch::Receiver<OutboxStatus> {
        self.sender.subscribe()
    }

    /// Stops listening to the outbox.
    ///
    /// Existing receivers keep the last status and see the channel close.
    pub fn detach(self) {}
}

fn project(previous: &OutboxStatus, entries: Vec<OutboxEntry>, clock: &dyn Clock) -> OutboxStatus {
    OutboxStatus::from_entries(entries, previous.last_synced_at, clock.now())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
