//! # Invocation Context
//!
//! Built once per matched message and handed to checks and the runner.
//! Cloning is cheap; nothing in it outlives the invocation.

use anyhow::Result;
use std::sync::Arc;

use crate::application::bot::Bot;
use crate::application::command::Command;
use crate::application::mirror::StateMirror;
use crate::domain::model::{Message, User};
use crate::domain::types::{Embed, Identity};

#[derive(Clone)]
pub struct Context {
    pub bot: Arc<Bot>,
    /// The prefix the command was invoked with.
    pub prefix: String,
    pub command: Arc<Command>,
    /// Lowercased tokens after the command name.
    pub args: Vec<String>,

    pub message: Arc<Message>,
    pub author: User,
    pub channel_id: String,
    pub guild_id: Option<String>,
}

impl Context {
    pub fn new(
        bot: Arc<Bot>,
        prefix: impl Into<String>,
        command: Arc<Command>,
        args: Vec<String>,
        message: Arc<Message>,
    ) -> Self {
        Self {
            bot,
            prefix: prefix.into(),
            command,
            args,
            author: message.author.clone(),
            channel_id: message.channel_id.clone(),
            guild_id: message.guild_id.clone(),
            message,
        }
    }

    /// Shorthand for [`Bot::me`].
    pub fn me(&self) -> Option<Identity> {
        self.bot.me()
    }

    pub fn state(&self) -> Option<&Arc<StateMirror>> {
        self.bot.state()
    }

    /// Sends text to the channel the command was invoked from.
    pub async fn reply(&self, content: &str) -> Result<String> {
        self.bot.session().send_message(&self.channel_id, content).await
    }

    /// Sends an embed to the channel the command was invoked from.
    pub async fn reply_embed(&self, embed: &Embed) -> Result<String> {
        self.bot.session().send_embed(&self.channel_id, embed).await
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("prefix", &self.prefix)
            .field("command", &self.command.name)
            .field("args", &self.args)
            .field("channel_id", &self.channel_id)
            .field("guild_id", &self.guild_id)
            .finish_non_exhaustive()
    }
}
