// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::clock::ManualClock;
use crate::entry::OutboxMethod;
use crate::storage::MemoryStore;
use chrono::{Duration, TimeZone};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
}

fn outbox_with_clock(start: DateTime<Utc>) -> (Arc<ManualClock>, Outbox) {
    let clock = Arc::new(ManualClock::new(start));
    let outbox = Outbox::builder(Arc::new(MemoryStore::new())).clock(clock.clone()).build();
    (clock, outbox)
}

#[test]
fn from_entries_with_empty_list_marks_synced_now() {
    let status = OutboxStatus::from_entries(Vec::new(), Some(at(9, 0)), at(10, 0));
    assert_eq!(status.pending_count, 0);
    assert!(!status.has_pending);
    assert_eq!(status.last_queued_at, None);
    assert_eq!(status.last_synced_at, Some(at(10, 0)));
}

#[test]
fn from_entries_keeps_previous_sync_while_pending() {
    let entry = OutboxEntry::new("1".into(), OutboxMethod::Post, "/a", None, None, at(9, 30));
    let status = OutboxStatus::from_entries(vec![entry], Some(at(9, 0)), at(10, 0));
    assert_eq!(status.pending_count, 1);
    assert!(status.has_pending);
    assert_eq!(status.last_synced_at, Some(at(9, 0)));
}

#[test]
fn last_queued_at_is_latest_created_at() {
    let entries = vec![
        OutboxEntry::new("1".into(), OutboxMethod::Post, "/a", None, None, at(9, 45)),
        OutboxEntry::new("2".into(), OutboxMethod::Post, "/b", None, None, at(9, 15)),
    ];
    let status = OutboxStatus::from_entries(entries, None, at(10, 0));
    assert_eq!(status.last_queued_at, Some(at(9, 45)));
}

#[tokio::test]
async fn attach_to_empty_outbox_reports_synced() {
    let (_, outbox) = outbox_with_clock(at(10, 0));
    let projection = StatusProjection::attach(&outbox).await;

    let status = projection.current();
    assert!(!status.has_pending);
    assert_eq!(status.last_synced_at, Some(at(10, 0)));
}

#[tokio::test]
async fn attach_loads_existing_entries() {
    let (_, outbox) = outbox_with_clock(at(10, 0));
    let entry = outbox.enqueue(OutboxMethod::Post, "/a", None, None).await.unwrap();

    let projection = StatusProjection::attach(&outbox).await;

    let status = projection.current();
    assert_eq!(status.entries, vec![entry]);
    assert_eq!(status.pending_count, 1);
    assert_eq!(status.last_queued_at, Some(at(10, 0)));
    assert_eq!(status.last_synced_at, None);
}

#[tokio::test]
async fn projection_follows_enqueue_and_remove() {
    let (clock, outbox) = outbox_with_clock(at(10, 0));
    let projection = StatusProjection::attach(&outbox).await;

    clock.advance(Duration::minutes(5));
    let entry = outbox.enqueue(OutboxMethod::Put, "/a", None, None).await.unwrap();
    let status = projection.current();
    assert_eq!(status.pending_count, 1);
    assert_eq!(status.last_queued_at, Some(at(10, 5)));
    assert_eq!(status.last_synced_at, Some(at(10, 0)));

    clock.advance(Duration::minutes(5));
    outbox.remove(&entry.id).await.unwrap();
    let status = projection.current();
    assert!(!status.has_pending);
    assert_eq!(status.last_synced_at, Some(at(10, 10)));
}

#[tokio::test]
async fn watch_receiver_sees_changes() {
    let (_, outbox) = outbox_with_clock(at(10, 0));
    let projection = StatusProjection::attach(&outbox).await;
    let mut receiver = projection.watch();
    receiver.borrow_and_update();

    outbox.enqueue(OutboxMethod::Delete, "/a", None, None).await.unwrap();

    receiver.changed().await.unwrap();
    assert_eq!(receiver.borrow().pending_count, 1);
}

#[tokio::test]
async fn detach_unsubscribes_and_closes_channel() {
    let (_, outbox) = outbox_with_clock(at(10, 0));
    let projection = StatusProjection::attach(&outbox).await;
    let mut receiver = projection.watch();
    assert_eq!(outbox.listener_count(), 1);

    projection.detach();

    assert_eq!(outbox.listener_count(), 0);
    outbox.enqueue(OutboxMethod::Post, "/a", None, None).await.unwrap();
    assert!(receiver.changed().await.is_err());
    assert_eq!(receiver.borrow().pending_count, 0);
}
