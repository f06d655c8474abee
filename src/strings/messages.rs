//! # Messages
//!
//! Constant strings and format functions for replies sent to users and for
//! the values the state mirror reports.

pub const PONG: &str = "Pong!";
pub const COMMAND_NOT_FOUND: &str = "Command not found.";
pub const GUILD_ONLY: &str = "This command can only be used in a server.";
pub const STATE_DISABLED: &str = "Bot does not have statekeeping enabled.";

pub fn too_few_args(prefix: &str, command: &str, count: usize) -> String {
    let noun = if count == 1 { "argument" } else { "arguments" };
    format!("`{prefix}{command}` needs at least {count} {noun}.")
}

// Stats

pub const STATS_TITLE: &str = "Bot statistics";
pub const STATS_EVENTS_FIELD: &str = "Events processed";
pub const STATS_SIZE_FIELD: &str = "State cache size";

pub fn events_count(count: &str) -> String {
    format!("{count} events")
}

pub fn keys_count(count: u64) -> String {
    format!("{count} keys")
}

pub fn unrecognized_event(name: &str) -> String {
    format!("Unrecognized event type '{name}', ignoring")
}
