//! # Command Registry
//!
//! Maps lowercase command names to their definitions. Lookups take a shared
//! read lock and clone an `Arc`, so a reader sees either the old or the new
//! definition, never a partial one.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::application::command::{Command, DEFAULT_CATEGORY};

#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, Arc<Command>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the command under its lowercased name, replacing any previous
    /// definition wholesale.
    pub fn register(&self, mut cmd: Command) -> Option<Arc<Command>> {
        cmd.name = cmd.name.to_lowercase();
        if cmd.category.is_empty() {
            cmd.category = DEFAULT_CATEGORY.to_string();
        }
        let name = cmd.name.clone();
        let mut guard = self.commands.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(name, Arc::new(cmd))
    }

    pub fn remove(&self, name: &str) -> Option<Arc<Command>> {
        let mut guard = self.commands.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Command>> {
        let guard = self.commands.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(&name.to_lowercase()).cloned()
    }

    /// Registered names, in no particular order.
    pub fn list(&self) -> Vec<String> {
        let guard = self.commands.read().unwrap_or_else(PoisonError::into_inner);
        guard.keys().cloned().collect()
    }

    /// Snapshot of every registered command.
    pub fn all(&self) -> Vec<Arc<Command>> {
        let guard = self.commands.read().unwrap_or_else(PoisonError::into_inner);
        guard.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.commands.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
