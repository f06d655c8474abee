//! # State Mirror
//!
//! Projects platform events into key-value records so other processes can
//! query guilds, channels, members and recent messages without talking to
//! the platform.
//!
//! Each event maps to one of: upsert, decompose-and-fan-out (guild
//! snapshots), cascading delete (guilds, channels), bulk delete, counter
//! increment, or ignore. Updates overwrite whole records; nothing is merged.
//!
//! None of the multi-key operations are transactional. Handlers for
//! different events may run concurrently, so a delete's scan can miss a
//! record written by an update that lands after it, leaving that record
//! behind until the entity is written or deleted again.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::domain::error::MirrorError;
use crate::domain::events::GatewayEvent;
use crate::domain::keys::{self, CONNECTS_COUNTER, EVENTS_COUNTER, GUILD_DEPENDENTS, Kind, MESSAGE_TTL_SECS};
use crate::domain::model::{Channel, Emoji, Guild, Member, Message, Presence, Role, User};
use crate::domain::traits::KvStore;
use crate::strings::messages;

type MirrorResult<T> = Result<T, MirrorError>;

pub struct StateMirror {
    store: Arc<dyn KvStore>,
}

impl StateMirror {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Entry point for the event stream. Never fails: store errors are logged
    /// as warnings and codec errors as errors, and the event is abandoned.
    pub async fn on_event(&self, event: &GatewayEvent) {
        if let Err(e) = self.apply(event).await {
            if e.is_codec() {
                error!(event = event.kind(), "State projection aborted: {}", e);
            } else {
                warn!(event = event.kind(), "State projection failed: {}", e);
            }
        }
    }

    /// Applies one event to the store.
    pub async fn apply(&self, event: &GatewayEvent) -> MirrorResult<()> {
        match event {
            GatewayEvent::Generic { .. } => {
                self.store.incr(EVENTS_COUNTER).await?;
            }
            GatewayEvent::Ready(ready) => {
                for guild in &ready.guilds {
                    self.upsert_guild(guild).await?;
                }
            }

            GatewayEvent::GuildCreate(guild) | GatewayEvent::GuildUpdate(guild) => {
                self.upsert_guild(guild).await?;
            }
            GatewayEvent::GuildDelete(guild) => self.delete_guild(&guild.id).await?,

            GatewayEvent::ChannelCreate(channel) | GatewayEvent::ChannelUpdate(channel) => {
                self.upsert_channel(channel).await?;
            }
            GatewayEvent::ChannelDelete(channel) => self.delete_channel(channel).await?,

            GatewayEvent::MessageCreate(message) | GatewayEvent::MessageUpdate(message) => {
                self.upsert_message(message).await?;
            }
            GatewayEvent::MessageDelete {
                channel_id,
                message_id,
            } => {
                self.store.del(&[keys::message(channel_id, message_id)]).await?;
            }
            GatewayEvent::MessageDeleteBulk {
                channel_id,
                message_ids,
            } => {
                let doomed: Vec<String> = message_ids
                    .iter()
                    .map(|id| keys::message(channel_id, id))
                    .collect();
                self.delete_keys(&doomed).await?;
            }

            GatewayEvent::GuildEmojisUpdate { guild_id, emojis } => {
                self.upsert_emojis(guild_id, emojis).await?;
            }
            GatewayEvent::GuildRoleCreate { guild_id, role }
            | GatewayEvent::GuildRoleUpdate { guild_id, role } => {
                self.upsert_role(guild_id, role).await?;
            }
            GatewayEvent::GuildRoleDelete { guild_id, role_id } => {
                self.store.del(&[keys::role(guild_id, role_id)]).await?;
            }

            GatewayEvent::UserUpdate(user) => self.upsert_user(user).await?,
            GatewayEvent::PresenceUpdate { guild_id, presence } => {
                self.upsert_presence(guild_id, presence).await?;
            }
            GatewayEvent::GuildMemberAdd(member) | GatewayEvent::GuildMemberUpdate(member) => {
                self.upsert_member(member).await?;
            }
            GatewayEvent::GuildMemberRemove(member) => {
                let guild_id = member.guild_id.as_deref().unwrap_or_default();
                self.store.del(&[keys::member(guild_id, &member.user.id)]).await?;
            }
            GatewayEvent::GuildMembersChunk { guild_id, members } => {
                for member in members {
                    self.upsert_member(&with_guild(member, guild_id)).await?;
                }
            }

            GatewayEvent::Connect => {
                self.store.incr(CONNECTS_COUNTER).await?;
            }
            GatewayEvent::TypingStart | GatewayEvent::Disconnect => {}

            GatewayEvent::Unrecognized { name } => {
                warn!("{}", messages::unrecognized_event(name));
            }
        }
        Ok(())
    }

    /// Stores the guild without its nested collections, then stores each
    /// detached element as its own record under the guild.
    async fn upsert_guild(&self, guild: &Guild) -> MirrorResult<()> {
        let mut record = guild.clone();
        let channels = std::mem::take(&mut record.channels);
        let roles = std::mem::take(&mut record.roles);
        let emojis = std::mem::take(&mut record.emojis);
        let members = std::mem::take(&mut record.members);
        let presences = std::mem::take(&mut record.presences);

        self.put(&keys::guild(&record.id), &record, None).await?;

        for channel in &channels {
            let mut channel = channel.clone();
            channel.guild_id = Some(record.id.clone());
            self.upsert_channel(&channel).await?;
        }
        for role in &roles {
            self.upsert_role(&record.id, role).await?;
        }
        self.upsert_emojis(&record.id, &emojis).await?;
        for member in &members {
            self.upsert_member(&with_guild(member, &record.id)).await?;
        }
        for presence in &presences {
            self.upsert_presence(&record.id, presence).await?;
        }

        debug!(
            guild = %record.id,
            channels = channels.len(),
            roles = roles.len(),
            emojis = emojis.len(),
            members = members.len(),
            presences = presences.len(),
            "Mirrored guild snapshot"
        );
        Ok(())
    }

    /// Deletes the guild, then scans and deletes each dependent kind.
    async fn delete_guild(&self, guild_id: &str) -> MirrorResult<()> {
        self.store.del(&[keys::guild(guild_id)]).await?;
        for kind in GUILD_DEPENDENTS {
            let doomed = self.store.keys(&kind.under(guild_id)).await?;
            self.delete_keys(&doomed).await?;
        }
        Ok(())
    }

    async fn upsert_channel(&self, channel: &Channel) -> MirrorResult<()> {
        let guild_id = channel.guild_id.as_deref().unwrap_or_default();
        self.put(&keys::channel(guild_id, &channel.id), channel, None).await
    }

    /// Deletes the channel, then every message cached for it.
    async fn delete_channel(&self, channel: &Channel) -> MirrorResult<()> {
        let guild_id = channel.guild_id.as_deref().unwrap_or_default();
        self.store.del(&[keys::channel(guild_id, &channel.id)]).await?;
        let doomed = self.store.keys(&Kind::Message.under(&channel.id)).await?;
        self.delete_keys(&doomed).await
    }

    async fn upsert_message(&self, message: &Message) -> MirrorResult<()> {
        let key = keys::message(&message.channel_id, &message.id);
        self.put(&key, message, Some(MESSAGE_TTL_SECS)).await
    }

    async fn upsert_emojis(&self, guild_id: &str, emojis: &[Emoji]) -> MirrorResult<()> {
        for emoji in emojis {
            self.put(&keys::emoji(guild_id, &emoji.id), emoji, None).await?;
        }
        Ok(())
    }

    async fn upsert_role(&self, guild_id: &str, role: &Role) -> MirrorResult<()> {
        self.put(&keys::role(guild_id, &role.id), role, None).await
    }

    async fn upsert_user(&self, user: &User) -> MirrorResult<()> {
        self.put(&keys::user(&user.id), user, None).await
    }

    async fn upsert_presence(&self, guild_id: &str, presence: &Presence) -> MirrorResult<()> {
        self.put(&keys::presence(guild_id, &presence.user.id), presence, None)
            .await
    }

    /// Stores the member and refreshes the user record it carries.
    async fn upsert_member(&self, member: &Member) -> MirrorResult<()> {
        let guild_id = member.guild_id.as_deref().unwrap_or_default();
        self.put(&keys::member(guild_id, &member.user.id), member, None)
            .await?;
        self.upsert_user(&member.user).await
    }

    async fn put<T: Serialize>(&self, key: &str, value: &T, expiry_secs: Option<u64>) -> MirrorResult<()> {
        let encoded = serde_json::to_string(value).map_err(|e| MirrorError::codec(key, e))?;
        self.store.set(key, &encoded, expiry_secs).await?;
        Ok(())
    }

    async fn delete_keys(&self, keys: &[String]) -> MirrorResult<()> {
        if !keys.is_empty() {
            self.store.del(keys).await?;
        }
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(&self, key: &str) -> MirrorResult<Option<T>> {
        match self.store.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| MirrorError::codec(key, e)),
            None => Ok(None),
        }
    }

    /// Every record matching `pattern`. Keys that expire or vanish between
    /// the scan and the read are skipped.
    async fn scan<T: DeserializeOwned>(&self, pattern: &str) -> MirrorResult<Vec<T>> {
        let mut found = self.store.keys(pattern).await?;
        found.sort();
        let mut records = Vec::with_capacity(found.len());
        for key in found {
            if let Some(record) = self.fetch(&key).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    // Read side

    pub async fn guilds(&self) -> MirrorResult<Vec<Guild>> {
        self.scan(&Kind::Guild.all()).await
    }

    pub async fn guild(&self, guild_id: &str) -> MirrorResult<Option<Guild>> {
        self.fetch(&keys::guild(guild_id)).await
    }

    pub async fn channels(&self, guild_id: &str) -> MirrorResult<Vec<Channel>> {
        self.scan(&Kind::Channel.under(guild_id)).await
    }

    pub async fn channel(&self, guild_id: &str, channel_id: &str) -> MirrorResult<Option<Channel>> {
        self.fetch(&keys::channel(guild_id, channel_id)).await
    }

    pub async fn members(&self, guild_id: &str) -> MirrorResult<Vec<Member>> {
        self.scan(&Kind::Member.under(guild_id)).await
    }

    pub async fn member(&self, guild_id: &str, user_id: &str) -> MirrorResult<Option<Member>> {
        self.fetch(&keys::member(guild_id, user_id)).await
    }

    /// Messages still cached for a channel.
    pub async fn messages(&self, channel_id: &str) -> MirrorResult<Vec<Message>> {
        self.scan(&Kind::Message.under(channel_id)).await
    }

    pub async fn message(&self, channel_id: &str, message_id: &str) -> MirrorResult<Option<Message>> {
        self.fetch(&keys::message(channel_id, message_id)).await
    }

    pub async fn user(&self, user_id: &str) -> MirrorResult<Option<User>> {
        self.fetch(&keys::user(user_id)).await
    }

    pub async fn presence(&self, guild_id: &str, user_id: &str) -> MirrorResult<Option<Presence>> {
        self.fetch(&keys::presence(guild_id, user_id)).await
    }

    pub async fn role(&self, guild_id: &str, role_id: &str) -> MirrorResult<Option<Role>> {
        self.fetch(&keys::role(guild_id, role_id)).await
    }

    /// Total lifecycle events processed, e.g. `"1523 events"`.
    pub async fn events(&self) -> MirrorResult<String> {
        let count = match self.store.get(EVENTS_COUNTER).await? {
            Some(raw) => raw,
            None => "0".to_string(),
        };
        Ok(messages::events_count(&count))
    }

    /// Number of keys in the store, e.g. `"87 keys"`.
    pub async fn size(&self) -> MirrorResult<String> {
        let size = self.store.dbsize().await?;
        Ok(messages::keys_count(size))
    }
}

/// Members nested in guild payloads do not carry their guild id.
fn with_guild(member: &Member, guild_id: &str) -> Member {
    let mut member = member.clone();
    member.guild_id = Some(guild_id.to_string());
    member
}
