use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::task::JoinHandle;
use tracing::debug;

use super::apartments::ApartmentCache;
use super::{METRIC_CACHE_ENTRIES, METRIC_CACHE_SWEPT};

/// Periodically reclaims expired entries. Abort the handle to stop it.
pub fn spawn_sweeper(cache: Arc<ApartmentCache>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            sweep_once(&cache);
        }
    })
}

/// One sweep pass; returns how many entries were reclaimed.
///
/// Listing keys whose entries are gone are released from the index in the
/// same pass, so a long read-only stretch cannot grow it without bound.
pub fn sweep_once(cache: &ApartmentCache) -> usize {
    let removed = cache.store().purge_expired();
    let released = cache.prune_listing_index();
    let remaining = cache.store().len();
    counter!(METRIC_CACHE_SWEPT).increment(removed as u64);
    gauge!(METRIC_CACHE_ENTRIES).set(remaining as f64);
    if removed > 0 || released > 0 {
        debug!(
            target = "apartments::cache::sweeper",
            removed,
            released,
            remaining,
            "Swept expired cache entries"
        );
    }
    removed
}
