//! # Platform Entities
//!
//! Serializable shapes of the entities the platform pushes: guilds, channels,
//! roles, emoji, users, members, presences and messages.
//!
//! Only the fields the bot reasons about are typed. Everything else the
//! platform sends is kept in `extra`, so a record read back from the store
//! serializes to exactly what was written.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Platform user account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "snowflake::required")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bot: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn is_blank(&self) -> bool {
        self.id.is_empty()
    }
}

/// Text, voice or category channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(deserialize_with = "snowflake::required")]
    pub id: String,
    #[serde(default, deserialize_with = "snowflake::optional")]
    pub guild_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(deserialize_with = "snowflake::required")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Emoji {
    #[serde(deserialize_with = "snowflake::required")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user's membership in one guild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default, deserialize_with = "snowflake::optional")]
    pub guild_id: Option<String>,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The partial user carried by a presence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceUser {
    #[serde(deserialize_with = "snowflake::required")]
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    pub user: PresenceUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(deserialize_with = "snowflake::required")]
    pub id: String,
    #[serde(deserialize_with = "snowflake::required")]
    pub channel_id: String,
    #[serde(default, deserialize_with = "snowflake::optional")]
    pub guild_id: Option<String>,
    /// Partial updates may omit the author; a blank author is not written.
    #[serde(default, skip_serializing_if = "User::is_blank")]
    pub author: User,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Guild snapshot as pushed on create/update.
///
/// The nested collections are only populated on arrival; the mirror detaches
/// them before storing the guild, and empty collections are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Guild {
    #[serde(deserialize_with = "snowflake::required")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "seq_or_map", skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<Channel>,
    #[serde(default, deserialize_with = "seq_or_map", skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
    #[serde(default, deserialize_with = "seq_or_map", skip_serializing_if = "Vec::is_empty")]
    pub emojis: Vec<Emoji>,
    #[serde(default, deserialize_with = "seq_or_map", skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
    #[serde(default, deserialize_with = "seq_or_map", skip_serializing_if = "Vec::is_empty")]
    pub presences: Vec<Presence>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Converts any serializable platform object into one of the entity shapes
/// above by way of its JSON form.
pub fn from_platform<T: Serialize, U: DeserializeOwned>(value: &T) -> serde_json::Result<U> {
    serde_json::from_value(serde_json::to_value(value)?)
}

/// Like [`from_platform`], for partial update payloads: top-level fields that
/// are null were absent from the update and are dropped before decoding.
pub fn from_partial<T: Serialize, U: DeserializeOwned>(value: &T) -> serde_json::Result<U> {
    let mut json = serde_json::to_value(value)?;
    if let Value::Object(fields) = &mut json {
        fields.retain(|_, field| !field.is_null());
    }
    serde_json::from_value(json)
}

/// Collections arrive either as arrays or as id-keyed objects depending on
/// the producer; both decode to a list.
fn seq_or_map<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Seq(Vec<T>),
        Map(std::collections::BTreeMap<String, T>),
        Null(()),
    }

    Ok(match Raw::<T>::deserialize(deserializer)? {
        Raw::Seq(items) => items,
        Raw::Map(items) => items.into_values().collect(),
        Raw::Null(()) => Vec::new(),
    })
}

/// Ids are decimal snowflakes, sent as strings or as integers.
mod snowflake {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(u64),
    }

    impl From<Raw> for String {
        fn from(raw: Raw) -> Self {
            match raw {
                Raw::Str(s) => s,
                Raw::Int(n) => n.to_string(),
            }
        }
    }

    pub fn required<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Raw::deserialize(deserializer).map(String::from)
    }

    pub fn optional<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Raw>::deserialize(deserializer)?.map(String::from))
    }
}
