// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use ob_client::NetworkState;
use ob_core::{OutboxEntry, OutboxStatus};

const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_MONTH: i64 = 43200;
const MINUTES_IN_TWO_MONTHS: i64 = 86400;

/// Describe the distance between `then` and `now` in words, with an
/// "ago" / "in" suffix.
///
/// Buckets: less than a minute, minutes, about N hours, days, about N months,
/// months, then about / over / almost N years.
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    let distance = format_distance(seconds.abs());
    if seconds < 0 {
        format!("in {distance}")
    } else {
        format!("{distance} ago")
    }
}

fn format_distance(seconds: i64) -> String {
    let minutes = (seconds as f64 / 60.0).round() as i64;

    if minutes == 0 {
        return "less than a minute".to_string();
    }
    if minutes < 45 {
        return plural(minutes, "minute");
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        let hours = (minutes as f64 / 60.0).round() as i64;
        return format!("about {}", plural(hours, "hour"));
    }
    if minutes < 2520 {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        let days = (minutes as f64 / MINUTES_IN_DAY as f64).round() as i64;
        return plural(days, "day");
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        let months = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as i64;
        return format!("about {}", plural(months, "month"));
    }

    let months = minutes / MINUTES_IN_MONTH;
    if months < 12 {
        let nearest = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as i64;
        return plural(nearest, "month");
    }
    let years = months / 12;
    match months % 12 {
        0..=2 => format!("about {}", plural(years, "year")),
        3..=8 => format!("over {}", plural(years, "year")),
        _ => format!("almost {}", plural(years + 1, "year")),
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Whether a sync banner would be shown: offline, or anything pending.
pub fn banner_visible(status: &OutboxStatus, network: &NetworkState) -> bool {
    network.is_offline() || status.pending_count > 0
}

/// Headline describing the sync state, e.g.
/// "Offline mode · showing cached data · 2 updates queued".
pub fn sync_message(status: &OutboxStatus, network: &NetworkState) -> String {
    let state = if network.is_offline() {
        "Offline mode · showing cached data"
    } else if status.pending_count > 0 {
        "Syncing changes"
    } else {
        "Back online"
    };

    match status.pending_count {
        0 => state.to_string(),
        1 => format!("{state} · 1 update queued"),
        n => format!("{state} · {n} updates queued"),
    }
}

/// Secondary line: when the last update was queued, or when the outbox was
/// last seen empty while online.
pub fn sync_supporting_text(status: &OutboxStatus, network: &NetworkState, now: DateTime<Utc>) -> Option<String> {
    if let Some(queued) = status.last_queued_at {
        return Some(format!("Last update queued {}", format_relative(queued, now)));
    }
    if network.is_offline() || status.pending_count > 0 {
        return None;
    }
    status
        .last_synced_at
        .map(|synced| format!("Last sync {}", format_relative(synced, now)))
}

/// One-line summary of a queued entry.
///
/// Format: `{id}  {METHOD} {url}  queued {relative}`
pub fn format_entry_line(entry: &OutboxEntry, now: DateTime<Utc>) -> String {
    format!(
        "{}  {}  queued {}",
        entry.id,
        entry.summary(),
        format_relative(entry.created_at, now)
    )
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
