//! # In-Memory Store
//!
//! Process-local [`KvStore`] with Redis semantics for the commands the mirror
//! uses: glob `KEYS`, `SET ... EX`, `INCR` on decimal strings. Used in tests
//! and when a caller wants a mirror without running Redis.

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::error::StoreError;
use crate::domain::traits::KvStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expiry_secs: Option<u64>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the map and drops anything that has expired.
    fn live(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        entries.retain(|_, entry| entry.is_live(now));
        entries
    }

    /// Expiry the key was last written with, if it is still present.
    pub fn expiry_secs(&self, key: &str) -> Option<u64> {
        self.live().get(key).and_then(|entry| entry.expiry_secs)
    }
}

/// Translates a Redis glob (`*`, `?`) into an anchored regex.
fn glob_to_regex(pattern: &str) -> Result<Regex, StoreError> {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push('^');
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    source.push('$');
    Regex::new(&source).map_err(|e| StoreError::Backend(e.to_string()))
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, expiry_secs: Option<u64>) -> Result<(), StoreError> {
        let entry = Entry {
            value: value.to_string(),
            expiry_secs,
            expires_at: expiry_secs.map(|secs| Instant::now() + Duration::from_secs(secs)),
        };
        self.live().insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.live().get(key).map(|entry| entry.value.clone()))
    }

    async fn del(&self, keys: &[String]) -> Result<u64, StoreError> {
        let mut entries = self.live();
        let removed = keys.iter().filter(|key| entries.remove(*key).is_some()).count();
        Ok(removed as u64)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let matcher = glob_to_regex(pattern)?;
        Ok(self
            .live()
            .keys()
            .filter(|key| matcher.is_match(key))
            .cloned()
            .collect())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut entries = self.live();
        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: "0".to_string(),
            expiry_secs: None,
            expires_at: None,
        });
        let current: i64 = entry.value.parse().map_err(|_| StoreError::NotAnInteger {
            key: key.to_string(),
        })?;
        let next = current + 1;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn dbsize(&self) -> Result<u64, StoreError> {
        Ok(self.live().len() as u64)
    }
}
