//! Apartment read cache
//!
//! An in-process TTL store sitting in front of the read paths:
//!
//! - **Entities**: `entity:{id}`
//! - **Listings**: `listing:{page}:{limit}:{sortField}:{sortOrder}`, only for
//!   unfiltered requests
//! - **Locations**: `popular_locations`
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! default_ttl_seconds = 3600
//! locations_ttl_seconds = 3600
//! sweep_interval_seconds = 300
//! ```

mod apartments;
mod config;
mod error;
mod keys;
mod lock;
mod registry;
mod store;
mod sweeper;

pub use apartments::ApartmentCache;
pub use config::CacheConfig;
pub use error::CacheError;
pub use keys::CacheKey;
pub use registry::ListingIndex;
pub use store::TtlStore;
pub use sweeper::{spawn_sweeper, sweep_once};

pub const METRIC_CACHE_HIT: &str = "apartments_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "apartments_cache_miss_total";
pub const METRIC_CACHE_INVALIDATED: &str = "apartments_cache_invalidated_total";
pub const METRIC_CACHE_DECODE_ERROR: &str = "apartments_cache_decode_error_total";
pub const METRIC_CACHE_SWEPT: &str = "apartments_cache_swept_total";
pub const METRIC_CACHE_ENTRIES: &str = "apartments_cache_entries";
