//! Listing query construction.
//!
//! Turns a validated [`ApartmentFilter`] into the predicate, ordering and
//! window the store executes, and decides whether the request is the
//! unfiltered listing that may be served from cache.

use std::cmp::Ordering;

use crate::application::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, offset_for};
use crate::cache::CacheKey;
use crate::domain::entities::ApartmentRecord;
use crate::domain::types::{SortField, SortOrder};

#[derive(Debug, Clone, PartialEq)]
pub struct ApartmentFilter {
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_area: Option<i32>,
    pub max_area: Option<i32>,
    pub bedrooms: Vec<i32>,
    pub bathrooms: Vec<i32>,
    pub locations: Vec<String>,
    pub amenities: Vec<String>,
    /// `None` lists available units only.
    pub is_available: Option<bool>,
    pub page: u32,
    pub limit: u32,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Default for ApartmentFilter {
    fn default() -> Self {
        Self {
            search: None,
            min_price: None,
            max_price: None,
            min_area: None,
            max_area: None,
            bedrooms: Vec::new(),
            bathrooms: Vec::new(),
            locations: Vec::new(),
            amenities: Vec::new(),
            is_available: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

/// Inclusive bounds; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// AND-combination of the optional filter parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ApartmentPredicate {
    /// Trimmed, non-empty token matched against the four text columns.
    pub search: Option<String>,
    pub price: Range<f64>,
    pub area: Range<i32>,
    pub bedrooms: Vec<i32>,
    pub bathrooms: Vec<i32>,
    pub locations: Vec<String>,
    /// Every listed amenity must be present.
    pub amenities: Vec<String>,
    pub is_available: bool,
}

impl ApartmentPredicate {
    /// In-memory evaluation; the SQL translation must select the same rows.
    pub fn matches(&self, record: &ApartmentRecord) -> bool {
        if let Some(token) = &self.search {
            let needle = token.to_lowercase();
            let hit = [
                &record.unit_name,
                &record.unit_number,
                &record.project,
                &record.location,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        self.price.contains(record.price)
            && self.area.contains(record.area_sqft)
            && (self.bedrooms.is_empty() || self.bedrooms.contains(&record.bedrooms))
            && (self.bathrooms.is_empty() || self.bathrooms.contains(&record.bathrooms))
            && (self.locations.is_empty() || self.locations.contains(&record.location))
            && record.has_all_amenities(&self.amenities)
            && record.is_available == self.is_available
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortDirective {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortDirective {
    /// Ordering used by the store, with `id` breaking ties in the same direction.
    pub fn compare(&self, left: &ApartmentRecord, right: &ApartmentRecord) -> Ordering {
        let primary = match self.field {
            SortField::Price => left.price.total_cmp(&right.price),
            SortField::CreatedAt => left.created_at.cmp(&right.created_at),
            SortField::AreaSqft => left.area_sqft.cmp(&right.area_sqft),
            SortField::Bedrooms => left.bedrooms.cmp(&right.bedrooms),
            SortField::Bathrooms => left.bathrooms.cmp(&right.bathrooms),
        };
        let ordering = primary.then_with(|| left.id.cmp(&right.id));
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub predicate: ApartmentPredicate,
    pub sort: SortDirective,
    pub page: u32,
    pub limit: u32,
    pub offset: u64,
    default_listing: bool,
}

impl ListingQuery {
    pub fn from_filter(filter: &ApartmentFilter) -> Self {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        let predicate = ApartmentPredicate {
            search,
            price: Range {
                min: filter.min_price,
                max: filter.max_price,
            },
            area: Range {
                min: filter.min_area,
                max: filter.max_area,
            },
            bedrooms: filter.bedrooms.clone(),
            bathrooms: filter.bathrooms.clone(),
            locations: filter.locations.clone(),
            amenities: filter.amenities.clone(),
            is_available: filter.is_available.unwrap_or(true),
        };

        let default_listing = predicate.search.is_none()
            && predicate.price.is_unbounded()
            && predicate.area.is_unbounded()
            && predicate.bedrooms.is_empty()
            && predicate.bathrooms.is_empty()
            && predicate.locations.is_empty()
            && predicate.amenities.is_empty()
            && filter.is_available.is_none();

        let page = filter.page.max(1);
        let limit = filter.limit.max(1);

        Self {
            predicate,
            sort: SortDirective {
                field: filter.sort_field,
                order: filter.sort_order,
            },
            page,
            limit,
            offset: offset_for(page, limit),
            default_listing,
        }
    }

    /// True when only pagination and sort were supplied.
    pub fn is_default_listing(&self) -> bool {
        self.default_listing
    }

    /// Cache key for this page when it is cacheable.
    pub fn cache_key(&self) -> Option<CacheKey> {
        self.default_listing.then_some(CacheKey::Listing {
            page: self.page,
            limit: self.limit,
            sort_field: self.sort.field,
            sort_order: self.sort.order,
        })
    }
}
