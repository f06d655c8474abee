//! # Bot and Dispatch Engine
//!
//! The bot owns the command registry, the prefix list and, once the platform
//! has signalled readiness, its own identity. Every incoming message walks
//! the same pipeline:
//!
//! `Unready -> Filtering -> Tokenizing -> Lookup -> Checking -> Executing`
//!
//! Anything that stops before `Executing` is a silent drop: nothing is sent
//! back and nothing is logged above `debug`. Runner errors are returned to the
//! caller untouched.

use anyhow::Result;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::application::checks;
use crate::application::command::Command;
use crate::application::context::Context;
use crate::application::help;
use crate::application::mirror::StateMirror;
use crate::application::prefix;
use crate::application::registry::CommandRegistry;
use crate::domain::events::GatewayEvent;
use crate::domain::model::Message;
use crate::domain::traits::Session;
use crate::domain::types::Identity;

/// Initialization state. Dispatch only happens in `Ready`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Created,
    AwaitingReady,
    Ready(Identity),
}

/// Why a message did not reach a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    Unready,
    SelfAuthored,
    EmptyMessage,
    NoPrefix,
    EmptyCommand,
    UnknownCommand(String),
    CheckFailed { command: String, index: usize },
}

/// Result of handing one message to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Executed { command: String },
    Dropped(DropReason),
}

/// A message that survived filtering, tokenizing and lookup.
#[derive(Debug)]
pub struct Invocation {
    pub prefix: String,
    pub command: Arc<Command>,
    pub args: Vec<String>,
}

pub struct Bot {
    session: Arc<dyn Session>,
    prefixes: Vec<String>,
    description: String,
    registry: CommandRegistry,
    phase: RwLock<Phase>,
    state: Option<Arc<StateMirror>>,
}

impl Bot {
    pub fn new(session: Arc<dyn Session>, prefixes: Vec<String>, description: impl Into<String>) -> Self {
        Self {
            session,
            prefixes,
            description: description.into(),
            registry: CommandRegistry::new(),
            phase: RwLock::new(Phase::Created),
            state: None,
        }
    }

    /// Attaches the state mirror so commands can reach it through the context.
    pub fn with_state(mut self, state: Arc<StateMirror>) -> Self {
        self.state = Some(state);
        self
    }

    /// Installs the default `help` command and starts waiting for readiness.
    pub fn init(self) -> Arc<Self> {
        self.registry.register(help::default_help());
        self.set_phase(Phase::AwaitingReady);
        Arc::new(self)
    }

    pub fn register_command(&self, cmd: Command) {
        debug!(command = %cmd.name, "Registering command");
        self.registry.register(cmd);
    }

    pub fn remove_command(&self, name: &str) {
        self.registry.remove(name);
    }

    pub fn command(&self, name: &str) -> Option<Arc<Command>> {
        self.registry.get(name)
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    pub fn state(&self) -> Option<&Arc<StateMirror>> {
        self.state.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The bot's own identity, once ready.
    pub fn me(&self) -> Option<Identity> {
        match self.phase() {
            Phase::Ready(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn mark_ready(&self, identity: Identity) {
        info!(id = %identity.id, name = %identity.name, "Bot is ready");
        self.set_phase(Phase::Ready(identity));
    }

    fn set_phase(&self, phase: Phase) {
        *self.phase.write().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    /// Consumes the events the engine cares about: readiness, own-account
    /// renames and new messages. Everything else is left to other consumers.
    pub async fn on_event(self: &Arc<Self>, event: &GatewayEvent) -> Result<Option<Dispatch>> {
        match event {
            GatewayEvent::Ready(ready) => {
                self.mark_ready(Identity {
                    id: ready.user.id.clone(),
                    name: ready.user.username.clone(),
                });
                Ok(None)
            }
            GatewayEvent::UserUpdate(user) => {
                if self.me().is_some_and(|me| me.id == user.id) {
                    self.mark_ready(Identity {
                        id: user.id.clone(),
                        name: user.username.clone(),
                    });
                }
                Ok(None)
            }
            GatewayEvent::MessageCreate(message) => {
                self.handle_message(Arc::new(message.clone())).await.map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Filtering, tokenizing and lookup. Pure apart from reading the
    /// registry and the phase.
    pub fn resolve(&self, message: &Message) -> std::result::Result<Invocation, DropReason> {
        let me = self.me().ok_or(DropReason::Unready)?;
        if message.author.id == me.id {
            return Err(DropReason::SelfAuthored);
        }
        if message.content.is_empty() {
            return Err(DropReason::EmptyMessage);
        }
        let prefix = prefix::resolve(&message.content, &self.prefixes).ok_or(DropReason::NoPrefix)?;

        let (name, args) = tokenize(&message.content[prefix.len()..]).ok_or(DropReason::EmptyCommand)?;
        let command = self
            .registry
            .get(&name)
            .ok_or(DropReason::UnknownCommand(name))?;

        Ok(Invocation {
            prefix: prefix.to_string(),
            command,
            args,
        })
    }

    /// Runs one message through the whole pipeline.
    pub async fn handle_message(self: &Arc<Self>, message: Arc<Message>) -> Result<Dispatch> {
        let invocation = match self.resolve(&message) {
            Ok(invocation) => invocation,
            Err(reason) => {
                tracing::trace!(message_id = %message.id, ?reason, "Dropping message");
                return Ok(Dispatch::Dropped(reason));
            }
        };

        let ctx = Context::new(
            self.clone(),
            invocation.prefix,
            invocation.command.clone(),
            invocation.args,
            message,
        );

        if let Err(index) = checks::evaluate(&invocation.command.checks, &ctx).await {
            debug!(command = %invocation.command.name, index, "Check failed");
            return Ok(Dispatch::Dropped(DropReason::CheckFailed {
                command: invocation.command.name.clone(),
                index,
            }));
        }

        debug!(
            command = %invocation.command.name,
            args = ?ctx.args,
            channel = %ctx.channel_id,
            "Dispatching command"
        );
        invocation.command.runner.run(ctx).await?;
        Ok(Dispatch::Executed {
            command: invocation.command.name.clone(),
        })
    }
}

/// Lowercases the text after the prefix and splits it on single spaces.
/// Returns the command name and its arguments, or `None` when nothing is left.
pub fn tokenize(rest: &str) -> Option<(String, Vec<String>)> {
    if rest.is_empty() {
        return None;
    }
    let lowered = rest.to_lowercase();
    let mut tokens = lowered.split(' ').map(str::to_string);
    let name = tokens.next()?;
    Some((name, tokens.collect()))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::domain::types::Embed;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records everything the bot sends.
    #[derive(Default)]
    pub struct RecordingSession {
        texts: Mutex<Vec<(String, String)>>,
        embeds: Mutex<Vec<(String, Embed)>>,
    }

    impl RecordingSession {
        pub fn texts(&self) -> Vec<(String, String)> {
            self.texts.lock().unwrap().clone()
        }

        pub fn embeds(&self) -> Vec<(String, Embed)> {
            self.embeds.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Session for RecordingSession {
        async fn send_message(&self, channel_id: &str, content: &str) -> Result<String> {
            let mut texts = self.texts.lock().unwrap();
            texts.push((channel_id.to_string(), content.to_string()));
            Ok(format!("sent-{}", texts.len()))
        }

        async fn send_embed(&self, channel_id: &str, embed: &Embed) -> Result<String> {
            let mut embeds = self.embeds.lock().unwrap();
            embeds.push((channel_id.to_string(), embed.clone()));
            Ok(format!("embed-{}", embeds.len()))
        }
    }

    pub const BOT_ID: &str = "1000";

    /// A bot with prefix `?` that has already seen readiness.
    pub fn ready_bot(session: Arc<RecordingSession>) -> Arc<Bot> {
        mark_ready(Bot::new(session, vec!["?".to_string()], "A testing bot").init())
    }

    /// Same as [`ready_bot`], with a state mirror attached.
    pub fn ready_bot_with_state(session: Arc<RecordingSession>, state: Arc<StateMirror>) -> Arc<Bot> {
        mark_ready(
            Bot::new(session, vec!["?".to_string()], "A testing bot")
                .with_state(state)
                .init(),
        )
    }

    fn mark_ready(bot: Arc<Bot>) -> Arc<Bot> {
        bot.mark_ready(Identity {
            id: BOT_ID.to_string(),
            name: "Switchboard".to_string(),
        });
        bot
    }

    pub fn message_from(author_id: &str, content: &str) -> Message {
        Message {
            id: "m1".to_string(),
            channel_id: "c1".to_string(),
            guild_id: Some("g1".to_string()),
            author: crate::domain::model::User {
                id: author_id.to_string(),
                username: "someone".to_string(),
                ..Default::default()
            },
            content: content.to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::domain::events::Ready;
    use crate::domain::model::User;
    use std::sync::Mutex;

    /// Registers `name` with a runner that records the arguments it saw.
    fn recording_command(bot: &Arc<Bot>, name: &str) -> Arc<Mutex<Vec<Vec<String>>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bot.register_command(Command::new(name, move |ctx: Context| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(ctx.args.clone());
                anyhow::Ok(())
            }
        }));
        seen
    }

    async fn send(bot: &Arc<Bot>, author: &str, content: &str) -> Dispatch {
        bot.handle_message(Arc::new(message_from(author, content)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_ping_without_checks_runs_with_zero_args() {
        let bot = ready_bot(Arc::new(RecordingSession::default()));
        let seen = recording_command(&bot, "ping");

        let outcome = send(&bot, "42", "?ping").await;

        assert_eq!(outcome, Dispatch::Executed { command: "ping".into() });
        assert_eq!(*seen.lock().unwrap(), vec![Vec::<String>::new()]);
    }

    #[tokio::test]
    async fn test_arguments_are_lowercased_and_split_on_spaces() {
        let bot = ready_bot(Arc::new(RecordingSession::default()));
        let seen = recording_command(&bot, "echo");

        send(&bot, "42", "?ECHO Hello World").await;

        assert_eq!(*seen.lock().unwrap(), vec![vec!["hello".to_string(), "world".to_string()]]);
    }

    #[tokio::test]
    async fn test_bare_prefix_is_dropped() {
        let bot = ready_bot(Arc::new(RecordingSession::default()));
        recording_command(&bot, "ping");

        assert_eq!(send(&bot, "42", "?").await, Dispatch::Dropped(DropReason::EmptyCommand));
    }

    #[tokio::test]
    async fn test_own_messages_never_dispatch() {
        let bot = ready_bot(Arc::new(RecordingSession::default()));
        let seen = recording_command(&bot, "ping");

        assert_eq!(send(&bot, BOT_ID, "?ping").await, Dispatch::Dropped(DropReason::SelfAuthored));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unready_bot_drops_everything() {
        let session = Arc::new(RecordingSession::default());
        let bot = Bot::new(session, vec!["?".into()], "").init();
        let seen = recording_command(&bot, "ping");

        assert_eq!(bot.phase(), Phase::AwaitingReady);
        assert_eq!(send(&bot, "42", "?ping").await, Dispatch::Dropped(DropReason::Unready));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ready_event_enables_dispatch() {
        let bot = Bot::new(Arc::new(RecordingSession::default()), vec!["?".into()], "").init();
        let seen = recording_command(&bot, "ping");

        let ready = GatewayEvent::Ready(Ready {
            user: User {
                id: "1000".into(),
                username: "Switchboard".into(),
                ..Default::default()
            },
            guilds: Vec::new(),
        });
        assert_eq!(bot.on_event(&ready).await.unwrap(), None);
        assert_eq!(bot.me().map(|me| me.name), Some("Switchboard".to_string()));

        let outcome = bot
            .on_event(&GatewayEvent::MessageCreate(message_from("42", "?ping")))
            .await
            .unwrap();
        assert_eq!(outcome, Some(Dispatch::Executed { command: "ping".into() }));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_filtering_drops_are_silent() {
        let session = Arc::new(RecordingSession::default());
        let bot = ready_bot(session.clone());
        recording_command(&bot, "ping");

        assert_eq!(send(&bot, "42", "").await, Dispatch::Dropped(DropReason::EmptyMessage));
        assert_eq!(send(&bot, "42", "ping").await, Dispatch::Dropped(DropReason::NoPrefix));
        assert_eq!(
            send(&bot, "42", "?pong").await,
            Dispatch::Dropped(DropReason::UnknownCommand("pong".into()))
        );
        assert!(session.texts().is_empty());
        assert!(session.embeds().is_empty());
    }

    #[tokio::test]
    async fn test_command_lookup_ignores_case() {
        let bot = ready_bot(Arc::new(RecordingSession::default()));
        let seen = recording_command(&bot, "Ping");

        send(&bot, "42", "?PING").await;
        send(&bot, "42", "?pInG").await;

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_check_stops_before_runner() {
        let session = Arc::new(RecordingSession::default());
        let bot = ready_bot(session.clone());
        let ran = Arc::new(Mutex::new(false));
        let flag = ran.clone();
        bot.register_command(
            Command::new("admin", move |_ctx: Context| {
                let flag = flag.clone();
                async move {
                    *flag.lock().unwrap() = true;
                    anyhow::Ok(())
                }
            })
            .check(|_ctx: Context| async { true })
            .check(|ctx: Context| async move {
                let _ = ctx.reply("You are not allowed to do that.").await;
                false
            }),
        );

        let outcome = send(&bot, "42", "?admin").await;

        assert_eq!(
            outcome,
            Dispatch::Dropped(DropReason::CheckFailed {
                command: "admin".into(),
                index: 1
            })
        );
        assert!(!*ran.lock().unwrap());
        assert_eq!(session.texts().len(), 1);
    }

    #[tokio::test]
    async fn test_runner_errors_propagate() {
        let bot = ready_bot(Arc::new(RecordingSession::default()));
        bot.register_command(Command::new("boom", |_ctx: Context| async {
            Err::<(), _>(anyhow::anyhow!("runner failed"))
        }));

        let err = bot
            .handle_message(Arc::new(message_from("42", "?boom")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "runner failed");
    }

    #[tokio::test]
    async fn test_prefix_order_decides_the_command_token() {
        let session = Arc::new(RecordingSession::default());
        let bot = Bot::new(session, vec!["?".into(), "?!".into()], "").init();
        bot.mark_ready(Identity { id: BOT_ID.into(), name: "b".into() });
        recording_command(&bot, "ping");

        // "?" wins, leaving "!ping" as the command token.
        assert_eq!(
            send(&bot, "42", "?!ping").await,
            Dispatch::Dropped(DropReason::UnknownCommand("!ping".into()))
        );
    }

    #[tokio::test]
    async fn test_removed_command_is_unknown() {
        let bot = ready_bot(Arc::new(RecordingSession::default()));
        recording_command(&bot, "ping");
        bot.remove_command("PING");

        assert_eq!(
            send(&bot, "42", "?ping").await,
            Dispatch::Dropped(DropReason::UnknownCommand("ping".into()))
        );
    }

    #[tokio::test]
    async fn test_help_lists_categories_in_order() {
        let session = Arc::new(RecordingSession::default());
        let bot = ready_bot(session.clone());
        bot.register_command(Command::new("roll", |_ctx: Context| async { anyhow::Ok(()) }).category("Fun"));
        bot.register_command(Command::new("ping", |_ctx: Context| async { anyhow::Ok(()) }));

        send(&bot, "42", "?help").await;

        let embeds = session.embeds();
        assert_eq!(embeds.len(), 1);
        let (channel, embed) = &embeds[0];
        assert_eq!(channel, "c1");
        assert_eq!(embed.title.as_deref(), Some("Command Help for Switchboard"));
        assert_eq!(embed.description.as_deref(), Some("A testing bot"));
        let fields: Vec<(&str, &str)> = embed
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(fields, vec![("Fun", "`roll`"), ("Generic", "`help, ping`")]);
    }

    #[tokio::test]
    async fn test_help_for_single_command() {
        let session = Arc::new(RecordingSession::default());
        let bot = ready_bot(session.clone());
        bot.register_command(
            Command::new("ping", |_ctx: Context| async { anyhow::Ok(()) })
                .description("Tests if the bot is working"),
        );

        send(&bot, "42", "?help PING").await;
        send(&bot, "42", "?help nope").await;

        let embeds = session.embeds();
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0].1.description.as_deref(), Some("`?ping`"));
        assert_eq!(
            embeds[0].1.get_field("Description").map(|f| f.value.as_str()),
            Some("Tests if the bot is working")
        );
        assert_eq!(session.texts(), vec![("c1".to_string(), "Command not found.".to_string())]);
    }

    #[tokio::test]
    async fn test_help_can_be_overridden() {
        let bot = ready_bot(Arc::new(RecordingSession::default()));
        let seen = recording_command(&bot, "help");

        send(&bot, "42", "?help").await;

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(bot.command("help").unwrap().category, "Generic");
    }

    #[test]
    fn test_tokenize_keeps_empty_tokens_between_double_spaces() {
        assert_eq!(tokenize(""), None);
        assert_eq!(tokenize("ping"), Some(("ping".to_string(), vec![])));
        assert_eq!(
            tokenize("Roll  D20"),
            Some(("roll".to_string(), vec![String::new(), "d20".to_string()]))
        );
    }
}
