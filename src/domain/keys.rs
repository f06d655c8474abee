//! # Composite Keys
//!
//! Store keys are `kind:parent:id` or `kind:id`, built from event payload
//! fields alone.

/// Total lifecycle events observed.
pub const EVENTS_COUNTER: &str = "stats:events";
/// Total gateway connections established.
pub const CONNECTS_COUNTER: &str = "stats:connects";

/// Message records expire after an hour.
pub const MESSAGE_TTL_SECS: u64 = 3600;

/// Record kinds held by the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Guild,
    Channel,
    Role,
    Emoji,
    User,
    Member,
    Presence,
    Message,
}

impl Kind {
    pub fn prefix(self) -> &'static str {
        match self {
            Kind::Guild => "guild",
            Kind::Channel => "channel",
            Kind::Role => "role",
            Kind::Emoji => "emoji",
            Kind::User => "user",
            Kind::Member => "member",
            Kind::Presence => "presence",
            Kind::Message => "msg",
        }
    }

    /// Key of an entity that lives under a parent.
    pub fn scoped(self, parent: &str, id: &str) -> String {
        format!("{}:{}:{}", self.prefix(), parent, id)
    }

    /// Key of a top-level entity.
    pub fn top(self, id: &str) -> String {
        format!("{}:{}", self.prefix(), id)
    }

    /// Glob matching every record of this kind under `parent`.
    pub fn under(self, parent: &str) -> String {
        format!("{}:{}:*", self.prefix(), parent)
    }

    /// Glob matching every record of this kind.
    pub fn all(self) -> String {
        format!("{}:*", self.prefix())
    }
}

/// Kinds removed together with their guild.
pub const GUILD_DEPENDENTS: [Kind; 5] = [
    Kind::Channel,
    Kind::Role,
    Kind::Emoji,
    Kind::Presence,
    Kind::Member,
];

pub fn guild(id: &str) -> String {
    Kind::Guild.top(id)
}

pub fn user(id: &str) -> String {
    Kind::User.top(id)
}

pub fn channel(guild_id: &str, id: &str) -> String {
    Kind::Channel.scoped(guild_id, id)
}

pub fn role(guild_id: &str, id: &str) -> String {
    Kind::Role.scoped(guild_id, id)
}

pub fn emoji(guild_id: &str, id: &str) -> String {
    Kind::Emoji.scoped(guild_id, id)
}

pub fn member(guild_id: &str, user_id: &str) -> String {
    Kind::Member.scoped(guild_id, user_id)
}

pub fn presence(guild_id: &str, user_id: &str) -> String {
    Kind::Presence.scoped(guild_id, user_id)
}

pub fn message(channel_id: &str, id: &str) -> String {
    Kind::Message.scoped(channel_id, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(guild("1"), "guild:1");
        assert_eq!(user("9"), "user:9");
        assert_eq!(channel("1", "2"), "channel:1:2");
        assert_eq!(member("1", "9"), "member:1:9");
        assert_eq!(presence("1", "9"), "presence:1:9");
        assert_eq!(message("2", "3"), "msg:2:3");
        assert_eq!(Kind::Role.under("1"), "role:1:*");
        assert_eq!(Kind::Guild.all(), "guild:*");
    }

    #[test]
    fn test_guild_dependents_exclude_top_level_kinds() {
        assert!(!GUILD_DEPENDENTS.contains(&Kind::Guild));
        assert!(!GUILD_DEPENDENTS.contains(&Kind::User));
        assert!(!GUILD_DEPENDENTS.contains(&Kind::Message));
    }
}
