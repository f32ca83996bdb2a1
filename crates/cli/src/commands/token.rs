// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::TokenCommand;
use crate::error::Result;

use super::Context;

pub async fn run(ctx: &Context, command: TokenCommand) -> Result<()> {
    let credentials = ctx.credentials(ctx.transport()?);
    match command {
        TokenCommand::Set { access, refresh } => {
            credentials.persist(&access, refresh.as_deref()).await?;
            println!("Stored access token");
        }
        TokenCommand::Clear => {
            credentials.clear().await?;
            println!("Cleared stored tokens");
        }
    }
    Ok(())
}
