// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `obx replay` and `obx watch`.

use std::sync::Arc;

use chrono::Utc;
use ob_client::{Connectivity, DrainOutcome, ReplayTrigger, TriggerReason};
use ob_core::StatusProjection;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::display::{sync_message, sync_supporting_text};
use crate::error::{Error, Result};

use super::Context;

/// Drains the outbox once.
pub async fn run(ctx: &Context, offline: bool) -> Result<()> {
    let trigger = ReplayTrigger::new(ctx.replay_engine()?, ctx.connectivity(offline)?);

    match trigger.fire(TriggerReason::Manual).await {
        None => {
            let pending = ctx.outbox.len().await;
            println!("Offline: {pending} request(s) still queued");
            Ok(())
        }
        Some(DrainOutcome::Drained { replayed }) => {
            println!("Replayed {replayed} request(s)");
            Ok(())
        }
        Some(DrainOutcome::Stopped {
            replayed,
            entry_id,
            error,
        }) => Err(Error::ReplayStopped {
            replayed,
            entry_id,
            reason: error.to_string(),
        }),
        Some(DrainOutcome::AlreadyDraining) => {
            println!("A replay is already running");
            Ok(())
        }
    }
}

/// Replays at startup and on every reconnect until Ctrl-C, printing the
/// sync state as it changes.
pub async fn watch(ctx: &Context) -> Result<()> {
    let cancel = CancellationToken::new();
    let probe = ctx.probe()?;
    let monitor = probe.spawn_monitor(ctx.config.poll_interval(), cancel.clone());
    let mut network = probe.subscribe();

    // No foreground events from a terminal; the sender stays alive so the
    // trigger keeps its app-state branch open.
    let (_app_states, app_states_rx) = mpsc::channel(1);
    let connectivity: Arc<dyn Connectivity> = probe.clone();
    let trigger = ReplayTrigger::new(ctx.replay_engine()?, connectivity).spawn(app_states_rx);

    let projection = StatusProjection::attach(&ctx.outbox).await;
    let mut status = projection.watch();
    info!(address = %probe.address(), "watching outbox");

    let mut last_printed = None;
    loop {
        let line = {
            let current = status.borrow_and_update().clone();
            let state = *network.borrow_and_update();
            let mut line = sync_message(&current, &state);
            if let Some(supporting) = sync_supporting_text(&current, &state, Utc::now()) {
                line = format!("{line} ({supporting})");
            }
            line
        };
        if last_printed.as_ref() != Some(&line) {
            println!("{line}");
            last_printed = Some(line);
        }

        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "failed to listen for ctrl-c");
                }
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = network.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    cancel.cancel();
    trigger.shutdown().await;
    if let Err(e) = monitor.await {
        warn!(error = %e, "connectivity monitor failed");
    }
    projection.detach();
    Ok(())
}
