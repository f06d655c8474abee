//! # Domain Traits
//!
//! Narrow interfaces to the two external collaborators: the chat session
//! used to reply, and the key-value store the mirror writes into.

use async_trait::async_trait;

use crate::domain::error::StoreError;
use crate::domain::types::Embed;

/// Outbound half of the platform session.
#[async_trait]
pub trait Session: Send + Sync {
    /// Send plain text to a channel. Returns the new message id.
    async fn send_message(&self, channel_id: &str, content: &str) -> anyhow::Result<String>;

    /// Send an embed to a channel. Returns the new message id.
    async fn send_embed(&self, channel_id: &str, embed: &Embed) -> anyhow::Result<String>;
}

/// The subset of a Redis-like store the mirror relies on.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// `SET key value [EX seconds]`
    async fn set(&self, key: &str, value: &str, expiry_secs: Option<u64>) -> Result<(), StoreError>;

    /// `GET key`
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// `DEL key...`, returning how many keys existed.
    async fn del(&self, keys: &[String]) -> Result<u64, StoreError>;

    /// `KEYS pattern` (glob)
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// `INCR key`
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;

    /// `DBSIZE`
    async fn dbsize(&self) -> Result<u64, StoreError>;
}
