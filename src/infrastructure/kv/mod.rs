//! # Key-Value Backends
//!
//! Implementations of [`crate::domain::traits::KvStore`].

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;
