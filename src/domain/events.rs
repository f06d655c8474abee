//! # Gateway Events
//!
//! The closed set of platform events consumed by the dispatch engine and the
//! state mirror. The platform adapter translates whatever its transport
//! delivers into these variants; anything it cannot classify becomes
//! `Unrecognized`.

use crate::domain::model::{Channel, Emoji, Guild, Member, Message, Presence, Role, User};

/// Readiness payload: the bot's own account and the guilds it belongs to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ready {
    pub user: User,
    pub guilds: Vec<Guild>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    Ready(Ready),

    GuildCreate(Guild),
    GuildUpdate(Guild),
    GuildDelete(Guild),

    ChannelCreate(Channel),
    ChannelUpdate(Channel),
    ChannelDelete(Channel),

    MessageCreate(Message),
    MessageUpdate(Message),
    MessageDelete {
        channel_id: String,
        message_id: String,
    },
    MessageDeleteBulk {
        channel_id: String,
        message_ids: Vec<String>,
    },

    GuildEmojisUpdate {
        guild_id: String,
        emojis: Vec<Emoji>,
    },
    GuildRoleCreate {
        guild_id: String,
        role: Role,
    },
    GuildRoleUpdate {
        guild_id: String,
        role: Role,
    },
    GuildRoleDelete {
        guild_id: String,
        role_id: String,
    },

    UserUpdate(User),
    PresenceUpdate {
        guild_id: String,
        presence: Presence,
    },

    GuildMemberAdd(Member),
    GuildMemberUpdate(Member),
    GuildMemberRemove(Member),
    GuildMembersChunk {
        guild_id: String,
        members: Vec<Member>,
    },

    Connect,
    TypingStart,
    Disconnect,

    /// Lifecycle marker delivered once for every raw dispatch the transport
    /// receives, in addition to the typed event.
    Generic {
        name: String,
    },

    Unrecognized {
        name: String,
    },
}

impl GatewayEvent {
    /// Stable name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayEvent::Ready(_) => "READY",
            GatewayEvent::GuildCreate(_) => "GUILD_CREATE",
            GatewayEvent::GuildUpdate(_) => "GUILD_UPDATE",
            GatewayEvent::GuildDelete(_) => "GUILD_DELETE",
            GatewayEvent::ChannelCreate(_) => "CHANNEL_CREATE",
            GatewayEvent::ChannelUpdate(_) => "CHANNEL_UPDATE",
            GatewayEvent::ChannelDelete(_) => "CHANNEL_DELETE",
            GatewayEvent::MessageCreate(_) => "MESSAGE_CREATE",
            GatewayEvent::MessageUpdate(_) => "MESSAGE_UPDATE",
            GatewayEvent::MessageDelete { .. } => "MESSAGE_DELETE",
            GatewayEvent::MessageDeleteBulk { .. } => "MESSAGE_DELETE_BULK",
            GatewayEvent::GuildEmojisUpdate { .. } => "GUILD_EMOJIS_UPDATE",
            GatewayEvent::GuildRoleCreate { .. } => "GUILD_ROLE_CREATE",
            GatewayEvent::GuildRoleUpdate { .. } => "GUILD_ROLE_UPDATE",
            GatewayEvent::GuildRoleDelete { .. } => "GUILD_ROLE_DELETE",
            GatewayEvent::UserUpdate(_) => "USER_UPDATE",
            GatewayEvent::PresenceUpdate { .. } => "PRESENCE_UPDATE",
            GatewayEvent::GuildMemberAdd(_) => "GUILD_MEMBER_ADD",
            GatewayEvent::GuildMemberUpdate(_) => "GUILD_MEMBER_UPDATE",
            GatewayEvent::GuildMemberRemove(_) => "GUILD_MEMBER_REMOVE",
            GatewayEvent::GuildMembersChunk { .. } => "GUILD_MEMBERS_CHUNK",
            GatewayEvent::Connect => "CONNECT",
            GatewayEvent::TypingStart => "TYPING_START",
            GatewayEvent::Disconnect => "DISCONNECT",
            GatewayEvent::Generic { .. } => "EVENT",
            GatewayEvent::Unrecognized { .. } => "UNRECOGNIZED",
        }
    }
}
