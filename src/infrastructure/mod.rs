//! # Infrastructure Layer
//!
//! Adapters to external systems: the Discord gateway and HTTP API, and the
//! key-value backends behind the state mirror.

pub mod discord;
pub mod kv;
