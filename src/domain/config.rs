//! # Configuration
//!
//! Loads the optional `config.yaml` and defines the settings the process
//! needs: the platform token, the command prefixes, the bot description and
//! the address of the state store. Command-line flags override file values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscordConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,
    #[serde(default = "default_description")]
    pub description: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            prefixes: default_prefixes(),
            description: default_description(),
        }
    }
}

/// State mirroring is disabled unless a store address is given.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default)]
    pub redis: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default)]
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            filter: None,
        }
    }
}

fn default_prefixes() -> Vec<String> {
    vec!["?".to_string()]
}

fn default_description() -> String {
    "A command-driven bot".to_string()
}

fn default_log_dir() -> String {
    "data".to_string()
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Reads `path` if it exists, otherwise starts from defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// The token, unless it is missing or blank.
    pub fn token(&self) -> Option<&str> {
        self.discord
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Store URL with a `redis://` scheme added to bare `host:port` addresses.
    pub fn redis_url(&self) -> Option<String> {
        let addr = self.state.redis.as_deref().map(str::trim)?;
        if addr.is_empty() {
            None
        } else if addr.contains("://") {
            Some(addr.to_string())
        } else {
            Some(format!("redis://{addr}"))
        }
    }

    /// Keeps the configured prefix order, dropping blanks. Falls back to the
    /// default prefix when nothing usable is left.
    pub fn prefixes(&self) -> Vec<String> {
        let prefixes: Vec<String> = self
            .discord
            .prefixes
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect();
        if prefixes.is_empty() {
            default_prefixes()
        } else {
            prefixes
        }
    }
}
