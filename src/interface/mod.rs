//! # Interface Layer
//!
//! Stock commands the binary installs on the bot.

pub mod commands;
