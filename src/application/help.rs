//! # Help Generator
//!
//! Read-only view over the command registry. Without arguments it renders
//! every command grouped by category; with a command name it renders that
//! command's reference card.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::command::{Command, DEFAULT_CATEGORY, Runner};
use crate::application::context::Context;
use crate::domain::types::Embed;
use crate::strings::{help, messages};

/// Groups command names by category. Categories and the names inside each
/// category come back sorted lexicographically.
pub fn aggregate(commands: &[Arc<Command>]) -> Vec<(String, Vec<String>)> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for cmd in commands {
        groups
            .entry(cmd.category.clone())
            .or_default()
            .push(cmd.name.clone());
    }
    groups
        .into_iter()
        .map(|(category, mut names)| {
            names.sort();
            (category, names)
        })
        .collect()
}

/// One inline field per category listing its commands.
pub fn menu(bot_name: &str, description: &str, commands: &[Arc<Command>]) -> Embed {
    let mut embed = Embed::new()
        .title(help::menu_title(bot_name))
        .description(description);
    for (category, names) in aggregate(commands) {
        embed = embed.field(category, help::command_list(&names), true);
    }
    embed
}

/// Reference card for a single command.
pub fn reference(prefix: &str, cmd: &Command) -> Embed {
    let mut embed = Embed::new()
        .title(help::REFERENCE_TITLE)
        .description(help::invocation(prefix, &cmd.name));
    if !cmd.description.is_empty() {
        embed = embed.field(help::DESCRIPTION_FIELD, cmd.description.clone(), false);
    }
    embed.field(help::CATEGORY_FIELD, cmd.category.clone(), true)
}

/// Runner of the built-in `help` command.
pub struct HelpRunner;

#[async_trait]
impl Runner for HelpRunner {
    async fn run(&self, ctx: Context) -> Result<()> {
        match ctx.args.first() {
            None => {
                let bot_name = ctx.me().map(|me| me.name).unwrap_or_default();
                let embed = menu(&bot_name, ctx.bot.description(), &ctx.bot.commands().all());
                ctx.reply_embed(&embed).await?;
            }
            Some(name) => match ctx.bot.command(name) {
                Some(cmd) => {
                    ctx.reply_embed(&reference(&ctx.prefix, &cmd)).await?;
                }
                None => {
                    ctx.reply(messages::COMMAND_NOT_FOUND).await?;
                }
            },
        }
        Ok(())
    }
}

/// The `help` command installed at initialization. Re-registering `help`
/// replaces it.
pub fn default_help() -> Command {
    Command::new("help", HelpRunner)
        .description(help::HELP_DESCRIPTION)
        .category(DEFAULT_CATEGORY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(name: &str, category: &str) -> Arc<Command> {
        let mut cmd = Command::new(name, |_ctx: Context| async { anyhow::Ok(()) });
        cmd.category = category.to_string();
        Arc::new(cmd)
    }

    #[test]
    fn test_aggregate_sorts_categories_and_names() {
        let commands = vec![
            cmd("stats", "Generic"),
            cmd("kick", "Moderation"),
            cmd("ban", "Moderation"),
            cmd("help", "Generic"),
            cmd("roll", "Fun"),
            cmd("ping", "Generic"),
        ];

        let groups = aggregate(&commands);
        assert_eq!(
            groups,
            vec![
                ("Fun".to_string(), vec!["roll".to_string()]),
                (
                    "Generic".to_string(),
                    vec!["help".to_string(), "ping".to_string(), "stats".to_string()]
                ),
                ("Moderation".to_string(), vec!["ban".to_string(), "kick".to_string()]),
            ]
        );
    }

    #[test]
    fn test_menu_has_one_inline_field_per_category() {
        let commands = vec![cmd("ping", "Generic"), cmd("help", "Generic"), cmd("roll", "Fun")];
        let embed = menu("Switchboard", "A testing bot", &commands);

        assert_eq!(embed.title.as_deref(), Some("Command Help for Switchboard"));
        assert_eq!(embed.description.as_deref(), Some("A testing bot"));
        assert_eq!(embed.fields.len(), 2);
        assert_eq!(embed.fields[0].name, "Fun");
        assert_eq!(embed.fields[1].name, "Generic");
        assert_eq!(embed.fields[1].value, "`help, ping`");
        assert!(embed.fields.iter().all(|f| f.inline));
    }

    #[test]
    fn test_reference_omits_empty_description() {
        let bare = cmd("ping", "Generic");
        let embed = reference("?", &bare);
        assert_eq!(embed.title.as_deref(), Some("Command Reference"));
        assert_eq!(embed.description.as_deref(), Some("`?ping`"));
        assert!(embed.get_field("Description").is_none());
        assert_eq!(embed.get_field("Category").map(|f| f.value.as_str()), Some("Generic"));

        let described = default_help();
        let embed = reference("!", &described);
        let field = embed.get_field("Description").unwrap();
        assert!(!field.inline);
        assert_eq!(field.value, help::HELP_DESCRIPTION);
    }
}
