//! # Help Text
//!
//! Titles and field names of the help menu and command reference embeds.

pub const HELP_DESCRIPTION: &str =
    "Lists every command by category, or shows the reference for one command.";

pub const REFERENCE_TITLE: &str = "Command Reference";
pub const DESCRIPTION_FIELD: &str = "Description";
pub const CATEGORY_FIELD: &str = "Category";

pub fn menu_title(bot_name: &str) -> String {
    format!("Command Help for {bot_name}")
}

/// Comma-separated command names in a code span.
pub fn command_list(names: &[String]) -> String {
    format!("`{}`", names.join(", "))
}

pub fn invocation(prefix: &str, name: &str) -> String {
    format!("`{prefix}{name}`")
}
