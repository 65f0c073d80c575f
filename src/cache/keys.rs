//! Cache key definitions.
//!
//! Keys render to the string forms `entity:{id}`,
//! `listing:{page}:{limit}:{sortField}:{sortOrder}` and `popular_locations`.

use std::fmt;

use uuid::Uuid;

use crate::domain::types::{SortField, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A single apartment by id.
    Entity(Uuid),
    /// One page of the unfiltered listing.
    Listing {
        page: u32,
        limit: u32,
        sort_field: SortField,
        sort_order: SortOrder,
    },
    /// The distinct-location list.
    PopularLocations,
}

impl CacheKey {
    /// Coarse label used for metrics.
    pub fn namespace(&self) -> &'static str {
        match self {
            CacheKey::Entity(_) => "entity",
            CacheKey::Listing { .. } => "listing",
            CacheKey::PopularLocations => "popular_locations",
        }
    }

    pub fn is_listing(&self) -> bool {
        matches!(self, CacheKey::Listing { .. })
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Entity(id) => write!(f, "entity:{id}"),
            CacheKey::Listing {
                page,
                limit,
                sort_field,
                sort_order,
            } => write!(f, "listing:{page}:{limit}:{sort_field}:{sort_order}"),
            CacheKey::PopularLocations => f.write_str("popular_locations"),
        }
    }
}
