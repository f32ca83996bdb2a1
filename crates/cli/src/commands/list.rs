// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;

use crate::cli::OutputFormat;
use crate::display::format_entry_line;
use crate::error::Result;

use super::Context;

pub async fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let entries = ctx.outbox.list().await;

    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No queued requests");
                return Ok(());
            }
            let now = Utc::now();
            for entry in &entries {
                println!("{}", format_entry_line(entry, now));
            }
        }
    }
    Ok(())
}
