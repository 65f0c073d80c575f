//! Typed access to the apartment read cache.
//!
//! Wraps the string store with JSON encoding, per-namespace TTLs, the listing
//! key index and metrics.

use std::sync::Arc;

use metrics::{counter, gauge};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use uuid::Uuid;

use super::config::CacheConfig;
use super::error::CacheError;
use super::keys::CacheKey;
use super::registry::ListingIndex;
use super::store::TtlStore;
use super::{
    METRIC_CACHE_DECODE_ERROR, METRIC_CACHE_ENTRIES, METRIC_CACHE_HIT, METRIC_CACHE_INVALIDATED,
    METRIC_CACHE_MISS,
};

pub struct ApartmentCache {
    config: CacheConfig,
    store: Arc<TtlStore>,
    listings: ListingIndex,
}

impl ApartmentCache {
    pub fn new(config: CacheConfig, store: Arc<TtlStore>) -> Self {
        Self {
            config,
            store,
            listings: ListingIndex::new(),
        }
    }

    /// Builds a cache over a fresh store using the configured default TTL.
    pub fn from_config(config: CacheConfig) -> Self {
        let store = Arc::new(TtlStore::new(config.default_ttl()));
        Self::new(config, store)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<TtlStore> {
        &self.store
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Looks up and decodes `key`.
    ///
    /// A value that fails to decode is deleted before the error is returned,
    /// so the next read repopulates it.
    pub fn get_json<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>, CacheError> {
        if !self.config.enabled {
            return Ok(None);
        }

        let rendered = key.to_string();
        let namespace = key.namespace();
        let Some(raw) = self.store.get(&rendered) else {
            counter!(METRIC_CACHE_MISS, "namespace" => namespace).increment(1);
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                counter!(METRIC_CACHE_HIT, "namespace" => namespace).increment(1);
                Ok(Some(value))
            }
            Err(source) => {
                counter!(METRIC_CACHE_DECODE_ERROR, "namespace" => namespace).increment(1);
                self.store.delete(&rendered);
                Err(CacheError::Decode {
                    key: rendered,
                    source,
                })
            }
        }
    }

    /// Encodes and stores `value` with the TTL for the key's namespace.
    pub fn put_json<T: Serialize>(&self, key: CacheKey, value: &T) -> Result<(), CacheError> {
        if !self.config.enabled {
            return Ok(());
        }

        let rendered = key.to_string();
        let encoded = serde_json::to_string(value).map_err(|source| CacheError::Encode {
            key: rendered.clone(),
            source,
        })?;

        let ttl = match key {
            CacheKey::PopularLocations => self.config.locations_ttl(),
            CacheKey::Entity(_) | CacheKey::Listing { .. } => self.store.default_ttl(),
        };
        self.store.set_with_ttl(rendered, ttl, encoded);
        self.listings.record(key);
        gauge!(METRIC_CACHE_ENTRIES).set(self.store.len() as f64);
        Ok(())
    }

    pub fn invalidate_entity(&self, id: Uuid) -> bool {
        self.invalidate(&CacheKey::Entity(id))
    }

    pub fn invalidate_locations(&self) -> bool {
        self.invalidate(&CacheKey::PopularLocations)
    }

    /// Deletes every listing page written since the previous drain.
    pub fn invalidate_listings(&self) -> usize {
        let keys = self.listings.drain();
        let removed = keys.iter().filter(|key| self.invalidate(key)).count();
        debug!(
            target = "apartments::cache",
            tracked = keys.len(),
            removed,
            "Invalidated listing pages"
        );
        removed
    }

    /// Forgets listing keys whose entry is no longer live in the store.
    pub fn prune_listing_index(&self) -> usize {
        self.listings
            .retain(|key| self.store.contains(&key.to_string()))
    }

    /// Number of listing keys awaiting the next invalidation.
    pub fn tracked_listings(&self) -> usize {
        self.listings.len()
    }

    pub fn clear(&self) {
        self.listings.drain();
        self.store.clear();
        gauge!(METRIC_CACHE_ENTRIES).set(0.0);
    }

    fn invalidate(&self, key: &CacheKey) -> bool {
        let existed = self.store.delete(&key.to_string());
        if existed {
            counter!(METRIC_CACHE_INVALIDATED, "namespace" => key.namespace()).increment(1);
        }
        existed
    }
}
