//! Expiring key/value storage.
//!
//! Values are opaque strings (serialized JSON). Every entry carries an
//! absolute expiry; reads never observe an expired value.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process TTL store shared behind an `Arc`.
///
/// There is no eviction under memory pressure; expired entries are removed
/// lazily by [`TtlStore::get`] and in bulk by [`TtlStore::purge_expired`].
pub struct TtlStore {
    entries: RwLock<HashMap<String, Entry>>,
    default_ttl: Duration,
}

impl TtlStore {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the value when present and unexpired.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let entries = rw_read(&self.entries, SOURCE, "get");
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        // Another writer may have refreshed the entry between the two locks.
        let mut entries = rw_write(&self.entries, SOURCE, "get.evict");
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        None
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.set_with_ttl(key, self.default_ttl, value);
    }

    pub fn set_with_ttl(&self, key: impl Into<String>, ttl: Duration, value: impl Into<String>) {
        let entry = Entry {
            value: value.into(),
            expires_at: Instant::now() + ttl,
        };
        rw_write(&self.entries, SOURCE, "set").insert(key.into(), entry);
    }

    /// Removes `key`, reporting whether an entry was present.
    pub fn delete(&self, key: &str) -> bool {
        rw_write(&self.entries, SOURCE, "delete")
            .remove(key)
            .is_some()
    }

    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "purge_expired");
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// True when `key` holds an unexpired entry. Never evicts.
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        rw_read(&self.entries, SOURCE, "contains")
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        rw_read(&self.entries, SOURCE, "remaining_ttl")
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at.saturating_duration_since(now))
    }

    /// Number of stored entries, expired ones included until reclaimed.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
