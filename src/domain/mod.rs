//! # Domain Layer
//!
//! Entity shapes, gateway events, store keys, configuration and the traits
//! the application layer is written against. Nothing here talks to the
//! network.

pub mod config;
pub mod error;
pub mod events;
pub mod keys;
pub mod model;
pub mod traits;
pub mod types;
