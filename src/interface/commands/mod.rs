//! # Command Handlers
//!
//! Runners for the stock commands. [`install`] registers all of them.

use crate::application::bot::Bot;

pub mod ping;
pub mod stats;

pub fn install(bot: &Bot) {
    bot.register_command(ping::command());
    bot.register_command(stats::command());
}
