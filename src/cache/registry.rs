//! Listing key index.
//!
//! Records every listing key actually written to the store so a mutation can
//! delete exactly those keys, whatever page/limit/sort combination produced
//! them. Keys whose entry has expired are dropped by the periodic sweep.

use std::collections::HashSet;
use std::sync::Mutex;

use super::keys::CacheKey;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::registry";

#[derive(Default)]
pub struct ListingIndex {
    keys: Mutex<HashSet<CacheKey>>,
}

impl ListingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a listing key; non-listing keys are ignored.
    pub fn record(&self, key: CacheKey) {
        if key.is_listing() {
            mutex_lock(&self.keys, SOURCE, "record").insert(key);
        }
    }

    /// Take every recorded key, leaving the index empty.
    pub fn drain(&self) -> Vec<CacheKey> {
        mutex_lock(&self.keys, SOURCE, "drain").drain().collect()
    }

    /// Keep only the keys for which `live` holds; returns how many were dropped.
    pub fn retain(&self, mut live: impl FnMut(&CacheKey) -> bool) -> usize {
        let mut keys = mutex_lock(&self.keys, SOURCE, "retain");
        let before = keys.len();
        keys.retain(|key| live(key));
        before - keys.len()
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.keys, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
