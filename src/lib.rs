//! # Switchboard
//!
//! A prefix-command bot framework for guild-based chat platforms, paired with
//! an optional mirror that projects the platform's event stream into a
//! key-value store.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod strings;
