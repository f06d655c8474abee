//! # Ping
//!
//! Liveness check.

use anyhow::Result;

use crate::application::command::{Command, DEFAULT_CATEGORY};
use crate::application::context::Context;
use crate::strings::messages;

pub async fn handle_ping(ctx: Context) -> Result<()> {
    ctx.reply(messages::PONG).await?;
    Ok(())
}

pub fn command() -> Command {
    Command::new("ping", handle_ping)
        .description("Tests if the bot is working")
        .category(DEFAULT_CATEGORY)
}
