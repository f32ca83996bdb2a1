// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The outbox store: a durable, ordered list of pending mutations.
//!
//! The whole list lives under one key of a [`KeyValueStore`] as a JSON
//! array. Every mutating operation reads the current list, changes it,
//! writes it back, and only then notifies subscribers with the new list.
//! Read-modify-write cycles are serialized by an async mutex so concurrent
//! enqueues cannot overwrite each other.
//!
//! Reads fail open: missing, unreadable, or unparsable data is treated as an
//! empty outbox. Writes fail closed: the operation returns the error and no
//! subscriber hears about it.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::codec::RequestBody;
use crate::entry::{OutboxEntry, OutboxMethod};
use crate::error::Result;
use crate::id::generate_entry_id;
use crate::storage::KeyValueStore;

/// Storage key used when none is configured.
pub const DEFAULT_OUTBOX_KEY: &str = "clinicq/outbox";

type Listener = Arc<dyn Fn(&[OutboxEntry]) + Send + Sync>;

/// Handle to a persisted outbox. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Outbox {
    inner: Arc<OutboxInner>,
}

struct OutboxInner {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    clock: Arc<dyn Clock>,
    /// Serializes read-modify-write cycles.
    write_lock: tokio::sync::Mutex<()>,
    listeners: Mutex<ListenerSet>,
}

#[derive(Default)]
struct ListenerSet {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
}

/// Builder for [`Outbox`].
pub struct OutboxBuilder {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    clock: Arc<dyn Clock>,
}

impl OutboxBuilder {
    /// Set the storage key the list is persisted under.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the clock used for `createdAt` timestamps.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Outbox {
        Outbox {
            inner: Arc::new(OutboxInner {
                storage: self.storage,
                key: self.key,
                clock: self.clock,
                write_lock: tokio::sync::Mutex::new(()),
                listeners: Mutex::new(ListenerSet::default()),
            }),
        }
    }
}

impl Outbox {
    /// Creates an outbox over `storage` with the default key and system clock.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::builder(storage).build()
    }

    pub fn builder(storage: Arc<dyn KeyValueStore>) -> OutboxBuilder {
        OutboxBuilder {
            storage,
            key: DEFAULT_OUTBOX_KEY.to_string(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Returns the storage key.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Returns the clock entries are stamped with.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.inner.clock)
    }

    /// Appends a new entry and persists the list.
    ///
    /// The body is encoded for storage; `attempt` starts at 0.
    pub async fn enqueue(
        &self,
        method: OutboxMethod,
        url: impl Into<String>,
        body: Option<&RequestBody>,
        headers: Option<BTreeMap<String, String>>,
    ) -> Result<OutboxEntry> {
        let _guard = self.inner.write_lock.lock().await;

        let mut entries = self.read_entries().await;
        let created_at = self.inner.clock.now();
        let entry = OutboxEntry::new(
            generate_entry_id(&created_at),
            method,
            url,
            body,
            headers,
            created_at,
        );
        entries.push(entry.clone());
        self.save_entries(&entries).await?;

        debug!(id = %entry.id, request = %entry.summary(), pending = entries.len(), "outbox entry enqueued");
        Ok(entry)
    }

    /// Removes the entry with `id`.
    ///
    /// Returns `false` without writing or notifying if no such entry exists.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let _guard = self.inner.write_lock.lock().await;

        let mut entries = self.read_entries().await;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }

        self.save_entries(&entries).await?;
        debug!(id, pending = entries.len(), "outbox entry removed");
        Ok(true)
    }

    /// Removes every entry.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.inner.write_lock.lock().await;
        self.save_entries(&[]).await
    }

    /// Returns the persisted entries in insertion order.
    pub async fn list(&self) -> Vec<OutboxEntry> {
        self.read_entries().await
    }

    /// Returns the number of persisted entries.
    pub async fn len(&self) -> usize {
        self.read_entries().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Registers `listener` to receive the full list after every successful
    /// enqueue, remove, or clear.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[OutboxEntry]) + Send + Sync + 'static,
    {
        let mut set = self.inner.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let id = set.next_id;
        set.next_id += 1;
        set.listeners.insert(id, Arc::new(listener));

        Subscription { outbox: Arc::downgrade(&self.inner), id }
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().unwrap_or_else(PoisonError::into_inner).listeners.len()
    }

    async fn read_entries(&self) -> Vec<OutboxEntry> {
        let key = self.inner.key.as_str();
        let raw = match self.inner.storage.get_string(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "failed to read outbox, treating it as empty");
                return Vec::new();
            }
        };

        if raw.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(key, error = %e, "outbox data is corrupted, treating it as empty");
                Vec::new()
            }
        }
    }

    async fn save_entries(&self, entries: &[OutboxEntry]) -> Result<()> {
        let json = serde_json::to_string(entries)?;
        self.inner.storage.set_string(&self.inner.key, json).await?;
        self.notify(entries);
        Ok(())
    }

    fn notify(&self, entries: &[OutboxEntry]) {
        // Snapshot so listeners may (un)subscribe without deadlocking.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .values()
            .cloned()
            .collect();

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| (*listener)(entries))).is_err() {
                warn!("outbox listener panicked, continuing with remaining listeners");
            }
        }
    }
}

impl fmt::Debug for Outbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outbox")
            .field("key", &self.inner.key)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Registration of an outbox listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    outbox: Weak<OutboxInner>,
    id: u64,
}

impl Subscription {
    /// Deregisters the listener.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.outbox.upgrade() {
            inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .remove(&self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
#[path = "outbox_tests.rs"]
mod tests;
