// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::{Error, Result};

use super::Context;

pub async fn run(ctx: &Context, id: &str) -> Result<()> {
    if !ctx.outbox.remove(id).await? {
        return Err(Error::EntryNotFound(id.to_string()));
    }
    println!("Removed {id}");
    Ok(())
}

pub async fn clear(ctx: &Context) -> Result<()> {
    let count = ctx.outbox.len().await;
    ctx.outbox.clear().await?;
    println!("Cleared {count} queued request{}", if count == 1 { "" } else { "s" });
    Ok(())
}
