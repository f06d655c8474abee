//! # Application Layer
//!
//! The command dispatch engine and the state mirror, plus process-wide
//! logging setup.

pub mod bot;
pub mod checks;
pub mod command;
pub mod context;
pub mod help;
pub mod logging;
pub mod mirror;
pub mod prefix;
pub mod registry;
