//! # Discord Adapter
//!
//! Connects the engine to Discord through serenity.
//!
//! [`DiscordSession`] is the outbound half: it sends replies over the HTTP
//! API. [`Handler`] is the inbound half: it translates serenity's typed
//! callbacks into [`GatewayEvent`]s and feeds each one to the dispatch
//! engine and, when configured, the state mirror. The two consumers run side
//! by side and neither sees the other's failures.

use anyhow::{Context as _, Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serenity::all::{
    ChannelId, CreateEmbed, CreateMessage, CurrentUser, Emoji as SerenityEmoji, EmojiId,
    GuildChannel, GuildId, GuildMemberUpdateEvent, GuildMembersChunkEvent, Http, Member as SerenityMember,
    Message as SerenityMessage, MessageId, MessageUpdateEvent, PartialGuild, Presence as SerenityPresence,
    Ready as SerenityReady, ResumedEvent, Role as SerenityRole, RoleId, TypingStartEvent, UnavailableGuild,
    User as SerenityUser,
};
use serenity::async_trait;
use serenity::client::{Context as SerenityContext, EventHandler, RawEventHandler};
use serenity::model::event::Event;
use serenity::model::guild::Guild as SerenityGuild;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::application::bot::{Bot, Dispatch};
use crate::application::mirror::StateMirror;
use crate::domain::events::{GatewayEvent, Ready};
use crate::domain::model::{self, Guild, Member, User};
use crate::domain::traits::Session;
use crate::domain::types::Embed;
use crate::strings::logs;

// Outbound

/// Sends messages through the Discord HTTP API.
pub struct DiscordSession {
    http: Arc<Http>,
}

impl DiscordSession {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    pub fn from_token(token: &str) -> Self {
        Self::new(Arc::new(Http::new(token)))
    }
}

fn channel_id(raw: &str) -> Result<ChannelId> {
    let id: u64 = raw
        .parse()
        .with_context(|| format!("Invalid channel id: {raw}"))?;
    if id == 0 {
        return Err(anyhow!("Invalid channel id: {raw}"));
    }
    Ok(ChannelId::new(id))
}

fn to_serenity_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new();
    if let Some(title) = &embed.title {
        builder = builder.title(title);
    }
    if let Some(description) = &embed.description {
        builder = builder.description(description);
    }
    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    builder
}

#[async_trait]
impl Session for DiscordSession {
    async fn send_message(&self, channel_id_raw: &str, content: &str) -> Result<String> {
        let channel = channel_id(channel_id_raw)?;
        let sent = channel
            .say(&*self.http, content)
            .await
            .map_err(|e| anyhow!("Failed to send message: {}", e))?;
        Ok(sent.id.get().to_string())
    }

    async fn send_embed(&self, channel_id_raw: &str, embed: &Embed) -> Result<String> {
        let channel = channel_id(channel_id_raw)?;
        let builder = CreateMessage::new().embed(to_serenity_embed(embed));
        let sent = channel
            .send_message(&*self.http, builder)
            .await
            .map_err(|e| anyhow!("Failed to send embed: {}", e))?;
        Ok(sent.id.get().to_string())
    }
}

// Inbound

/// Converts a serenity model into one of the crate's entity shapes.
fn convert<T: Serialize, U: DeserializeOwned>(what: &str, value: &T) -> Option<U> {
    match model::from_platform(value) {
        Ok(converted) => Some(converted),
        Err(e) => {
            error!("Failed to convert {} payload: {}", what, e);
            None
        }
    }
}

/// Converts a partial update payload, keeping only the fields it carried.
fn convert_partial<T: Serialize, U: DeserializeOwned>(what: &str, value: &T) -> Option<U> {
    match model::from_partial(value) {
        Ok(converted) => Some(converted),
        Err(e) => {
            error!("Failed to convert {} payload: {}", what, e);
            None
        }
    }
}

fn guild_stub(id: GuildId) -> Guild {
    Guild {
        id: id.get().to_string(),
        ..Default::default()
    }
}

/// Dispatch names the typed handler turns into [`GatewayEvent`]s.
const TRANSLATED_EVENTS: &[&str] = &[
    "READY",
    "RESUMED",
    "GUILD_CREATE",
    "GUILD_UPDATE",
    "GUILD_DELETE",
    "CHANNEL_CREATE",
    "CHANNEL_UPDATE",
    "CHANNEL_DELETE",
    "MESSAGE_CREATE",
    "MESSAGE_UPDATE",
    "MESSAGE_DELETE",
    "MESSAGE_DELETE_BULK",
    "GUILD_EMOJIS_UPDATE",
    "GUILD_ROLE_CREATE",
    "GUILD_ROLE_UPDATE",
    "GUILD_ROLE_DELETE",
    "USER_UPDATE",
    "PRESENCE_UPDATE",
    "GUILD_MEMBER_ADD",
    "GUILD_MEMBER_UPDATE",
    "GUILD_MEMBER_REMOVE",
    "GUILD_MEMBERS_CHUNK",
    "TYPING_START",
];

/// Events for one raw dispatch. Every named dispatch counts once; names the
/// typed handler does not translate are also reported as unrecognized.
fn raw_events(name: Option<&str>) -> Vec<GatewayEvent> {
    let Some(name) = name else {
        return vec![GatewayEvent::Unrecognized {
            name: "UNKNOWN".to_string(),
        }];
    };
    let mut events = vec![GatewayEvent::Generic {
        name: name.to_string(),
    }];
    if !TRANSLATED_EVENTS.contains(&name) {
        events.push(GatewayEvent::Unrecognized {
            name: name.to_string(),
        });
    }
    events
}

/// Message edits usually arrive without a cached copy of the message, so
/// the update payload itself becomes the record.
fn message_update_event<T: Serialize>(update: &T) -> Option<GatewayEvent> {
    convert_partial("message update", update).map(GatewayEvent::MessageUpdate)
}

fn member_removal_event<T: Serialize>(guild_id: GuildId, user: &T) -> Option<GatewayEvent> {
    let user: User = convert("user", user)?;
    Some(GatewayEvent::GuildMemberRemove(Member {
        guild_id: Some(guild_id.get().to_string()),
        user,
        ..Default::default()
    }))
}

fn guild_delete_event(guild_id: GuildId) -> GatewayEvent {
    GatewayEvent::GuildDelete(guild_stub(guild_id))
}

/// Serenity event handler feeding both pipelines.
#[derive(Clone)]
pub struct Handler {
    bot: Arc<Bot>,
    mirror: Option<Arc<StateMirror>>,
}

impl Handler {
    pub fn new(bot: Arc<Bot>, mirror: Option<Arc<StateMirror>>) -> Self {
        Self { bot, mirror }
    }

    async fn dispatch(&self, event: GatewayEvent) {
        let engine = async {
            match self.bot.on_event(&event).await {
                Ok(Some(Dispatch::Executed { command })) => {
                    debug!(command = %command, "Command executed");
                }
                Ok(_) => {}
                Err(e) => error!("{}", logs::dispatch_failed(event.kind(), &e.to_string())),
            }
        };
        let mirror = async {
            if let Some(mirror) = &self.mirror {
                mirror.on_event(&event).await;
            }
        };
        futures::join!(engine, mirror);
    }

    async fn dispatch_converted<T, U, F>(&self, what: &str, value: &T, wrap: F)
    where
        T: Serialize,
        U: DeserializeOwned,
        F: FnOnce(U) -> GatewayEvent,
    {
        if let Some(converted) = convert(what, value) {
            self.dispatch(wrap(converted)).await;
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: SerenityContext, ready: SerenityReady) {
        info!("{}", logs::connected_as(&ready.user.name, &ready.user.id.get().to_string()));
        let Some(mut user) = convert::<_, User>("ready user", &ready.user) else {
            return;
        };
        user.id = ready.user.id.get().to_string();
        let guilds = ready.guilds.iter().map(|g| guild_stub(g.id)).collect();
        self.dispatch(GatewayEvent::Ready(Ready { user, guilds })).await;
        self.dispatch(GatewayEvent::Connect).await;
    }

    async fn resume(&self, _ctx: SerenityContext, _event: ResumedEvent) {
        self.dispatch(GatewayEvent::Connect).await;
    }

    async fn guild_create(&self, _ctx: SerenityContext, guild: SerenityGuild, _is_new: Option<bool>) {
        self.dispatch_converted("guild", &guild, GatewayEvent::GuildCreate).await;
    }

    async fn guild_update(
        &self,
        _ctx: SerenityContext,
        _old_data_if_available: Option<SerenityGuild>,
        new_data: PartialGuild,
    ) {
        self.dispatch_converted("guild", &new_data, GatewayEvent::GuildUpdate).await;
    }

    async fn guild_delete(&self, _ctx: SerenityContext, incomplete: UnavailableGuild, _full: Option<SerenityGuild>) {
        self.dispatch(guild_delete_event(incomplete.id)).await;
    }

    async fn channel_create(&self, _ctx: SerenityContext, channel: GuildChannel) {
        self.dispatch_converted("channel", &channel, GatewayEvent::ChannelCreate).await;
    }

    async fn channel_update(&self, _ctx: SerenityContext, _old: Option<GuildChannel>, new: GuildChannel) {
        self.dispatch_converted("channel", &new, GatewayEvent::ChannelUpdate).await;
    }

    async fn channel_delete(
        &self,
        _ctx: SerenityContext,
        channel: GuildChannel,
        _messages: Option<Vec<SerenityMessage>>,
    ) {
        self.dispatch_converted("channel", &channel, GatewayEvent::ChannelDelete)
            .await;
    }

    async fn message(&self, _ctx: SerenityContext, msg: SerenityMessage) {
        self.dispatch_converted("message", &msg, GatewayEvent::MessageCreate)
            .await;
    }

    async fn message_update(
        &self,
        _ctx: SerenityContext,
        _old_if_available: Option<SerenityMessage>,
        new: Option<SerenityMessage>,
        event: MessageUpdateEvent,
    ) {
        match new {
            Some(full) => {
                self.dispatch_converted("message", &full, GatewayEvent::MessageUpdate).await;
            }
            None => {
                if let Some(update) = message_update_event(&event) {
                    self.dispatch(update).await;
                }
            }
        }
    }

    async fn message_delete(
        &self,
        _ctx: SerenityContext,
        channel_id: ChannelId,
        deleted_message_id: MessageId,
        _guild_id: Option<GuildId>,
    ) {
        self.dispatch(GatewayEvent::MessageDelete {
            channel_id: channel_id.get().to_string(),
            message_id: deleted_message_id.get().to_string(),
        })
        .await;
    }

    async fn message_delete_bulk(
        &self,
        _ctx: SerenityContext,
        channel_id: ChannelId,
        multiple_deleted_messages_ids: Vec<MessageId>,
        _guild_id: Option<GuildId>,
    ) {
        self.dispatch(GatewayEvent::MessageDeleteBulk {
            channel_id: channel_id.get().to_string(),
            message_ids: multiple_deleted_messages_ids
                .iter()
                .map(|id| id.get().to_string())
                .collect(),
        })
        .await;
    }

    async fn guild_emojis_update(
        &self,
        _ctx: SerenityContext,
        guild_id: GuildId,
        current_state: HashMap<EmojiId, SerenityEmoji>,
    ) {
        let emojis = current_state
            .values()
            .filter_map(|emoji| convert("emoji", emoji))
            .collect();
        self.dispatch(GatewayEvent::GuildEmojisUpdate {
            guild_id: guild_id.get().to_string(),
            emojis,
        })
        .await;
    }

    async fn guild_role_create(&self, _ctx: SerenityContext, new: SerenityRole) {
        let guild_id = new.guild_id.get().to_string();
        self.dispatch_converted("role", &new, |role| GatewayEvent::GuildRoleCreate { guild_id, role })
            .await;
    }

    async fn guild_role_update(&self, _ctx: SerenityContext, _old_data_if_available: Option<SerenityRole>, new: SerenityRole) {
        let guild_id = new.guild_id.get().to_string();
        self.dispatch_converted("role", &new, |role| GatewayEvent::GuildRoleUpdate { guild_id, role })
            .await;
    }

    async fn guild_role_delete(
        &self,
        _ctx: SerenityContext,
        guild_id: GuildId,
        removed_role_id: RoleId,
        _removed_role_data_if_available: Option<SerenityRole>,
    ) {
        self.dispatch(GatewayEvent::GuildRoleDelete {
            guild_id: guild_id.get().to_string(),
            role_id: removed_role_id.get().to_string(),
        })
        .await;
    }

    async fn user_update(&self, _ctx: SerenityContext, _old_data: Option<CurrentUser>, new: CurrentUser) {
        self.dispatch_converted("user", &new, GatewayEvent::UserUpdate).await;
    }

    async fn presence_update(&self, _ctx: SerenityContext, new_data: SerenityPresence) {
        let Some(guild_id) = new_data.guild_id else {
            return;
        };
        let guild_id = guild_id.get().to_string();
        self.dispatch_converted("presence", &new_data, |presence| GatewayEvent::PresenceUpdate {
            guild_id,
            presence,
        })
        .await;
    }

    async fn guild_member_addition(&self, _ctx: SerenityContext, new_member: SerenityMember) {
        self.dispatch_converted("member", &new_member, GatewayEvent::GuildMemberAdd)
            .await;
    }

    async fn guild_member_update(
        &self,
        _ctx: SerenityContext,
        _old_if_available: Option<SerenityMember>,
        new: Option<SerenityMember>,
        event: GuildMemberUpdateEvent,
    ) {
        match new {
            Some(full) => {
                self.dispatch_converted("member", &full, GatewayEvent::GuildMemberUpdate).await;
            }
            None => {
                if let Some(member) = convert_partial("member update", &event) {
                    self.dispatch(GatewayEvent::GuildMemberUpdate(member)).await;
                }
            }
        }
    }

    async fn guild_member_removal(
        &self,
        _ctx: SerenityContext,
        guild_id: GuildId,
        user: SerenityUser,
        _member_data_if_available: Option<SerenityMember>,
    ) {
        if let Some(removal) = member_removal_event(guild_id, &user) {
            self.dispatch(removal).await;
        }
    }

    async fn guild_members_chunk(&self, _ctx: SerenityContext, chunk: GuildMembersChunkEvent) {
        let members = chunk
            .members
            .values()
            .filter_map(|member| convert("member", member))
            .collect();
        self.dispatch(GatewayEvent::GuildMembersChunk {
            guild_id: chunk.guild_id.get().to_string(),
            members,
        })
        .await;
    }

    async fn typing_start(&self, _ctx: SerenityContext, _event: TypingStartEvent) {
        self.dispatch(GatewayEvent::TypingStart).await;
    }
}

#[async_trait]
impl RawEventHandler for Handler {
    /// Every gateway dispatch counts once toward the processed-events total.
    async fn raw_event(&self, _ctx: SerenityContext, ev: Event) {
        let Some(mirror) = &self.mirror else {
            return;
        };
        let name = ev.name().map(|name| name.to_string());
        for event in raw_events(name.as_deref()) {
            mirror.on_event(&event).await;
        }
    }
}
