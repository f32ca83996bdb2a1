// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;
use ob_client::Connectivity;
use ob_core::StatusProjection;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::display::{banner_visible, sync_message, sync_supporting_text};
use crate::error::Result;

use super::Context;

pub async fn run(ctx: &Context, output: OutputFormat, offline: bool) -> Result<()> {
    let projection = StatusProjection::attach(&ctx.outbox).await;
    let network = ctx.connectivity(offline)?.fetch().await;
    let status = projection.current();
    let now = Utc::now();

    let message = sync_message(&status, &network);
    let supporting = sync_supporting_text(&status, &network, now);

    match output {
        OutputFormat::Json => {
            let report = json!({
                "status": status,
                "network": network,
                "bannerVisible": banner_visible(&status, &network),
                "message": message,
                "supporting": supporting,
                "stateDir": ctx.state_dir,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("{message}");
            if let Some(supporting) = supporting {
                println!("{supporting}");
            }
        }
    }
    Ok(())
}
