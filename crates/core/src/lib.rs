// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ob-core: durable outbox for offline mutations
//!
//! This crate provides the entry model, the body codec, the key-value
//! persistence boundary, the outbox store, and the status projection used by
//! the replaying client and the obx CLI.

pub mod clock;
pub mod codec;
pub mod entry;
pub mod error;
pub mod id;
pub mod outbox;
pub mod status;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{BinaryPart, FileRef, Multipart, PartValue, RequestBody};
pub use entry::{OutboxEntry, OutboxMethod};
pub use error::{Error, Result};
pub use outbox::{Outbox, OutboxBuilder, Subscription, DEFAULT_OUTBOX_KEY};
pub use status::{OutboxStatus, StatusProjection};
pub use storage::{BoxFuture, FileStore, KeyValueStore, MemoryStore};
