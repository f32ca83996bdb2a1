// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate an outbox entry ID from the enqueue time.
/// Format: {unix_ms}-{suffix} where suffix is the first 8 hex chars of
/// SHA256(nanos + pid + sequence)
pub fn generate_entry_id(created_at: &DateTime<Utc>) -> String {
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let nanos = created_at.timestamp_subsec_nanos();
    let input = format!(
        "{}:{}:{}:{}",
        created_at.timestamp(),
        nanos,
        std::process::id(),
        sequence
    );
    let hash = Sha256::digest(input.as_bytes());
    let suffix = hex::encode(&hash[..4]);
    format!("{}-{}", created_at.timestamp_millis(), suffix)
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
