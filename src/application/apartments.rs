//! Apartment reads and writes with cache-aside caching.
//!
//! Reads consult the cache first; writes go to the store and then invalidate
//! every cached entry that could reflect the old state.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::pagination::{MAX_LIMIT, Paginated};
use crate::application::query::{ApartmentFilter, ListingQuery};
use crate::application::repos::{
    ApartmentsRepo, ApartmentsWriteRepo, CreateApartmentParams, RepoError, UpdateApartmentParams,
};
use crate::cache::{ApartmentCache, CacheKey};
use crate::domain::apartments as rules;
use crate::domain::entities::{ApartmentRecord, LocationCount};
use crate::domain::error::DomainError;

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum ApartmentError {
    #[error("apartment `{id}` not found")]
    NotFound { id: Uuid },
    #[error("apartment conflicts with an existing record (`{constraint}`)")]
    Conflict { constraint: String },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(RepoError),
}

impl ApartmentError {
    /// Classifies a store failure; `id` is reported when the row was missing.
    pub fn from_repo(err: RepoError, id: Option<Uuid>) -> Self {
        match (err, id) {
            (RepoError::Duplicate { constraint }, _) => Self::Conflict { constraint },
            (RepoError::NotFound, Some(id)) => Self::NotFound { id },
            (RepoError::InvalidInput { message }, _) => Self::Validation(message),
            (other, _) => Self::Storage(other),
        }
    }
}

impl From<DomainError> for ApartmentError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { field, message } => {
                Self::Validation(format!("`{field}` {message}"))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateApartmentCommand {
    pub unit_name: String,
    pub unit_number: String,
    pub project: String,
    pub price: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqft: i32,
    pub location: String,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateApartmentCommand {
    pub unit_name: Option<String>,
    pub unit_number: Option<String>,
    pub project: Option<String>,
    pub price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqft: Option<i32>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

#[derive(Clone)]
pub struct ApartmentService {
    reader: Arc<dyn ApartmentsRepo>,
    writer: Arc<dyn ApartmentsWriteRepo>,
    cache: Arc<ApartmentCache>,
}

impl ApartmentService {
    pub fn new(
        reader: Arc<dyn ApartmentsRepo>,
        writer: Arc<dyn ApartmentsWriteRepo>,
        cache: Arc<ApartmentCache>,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<ApartmentCache> {
        &self.cache
    }

    #[instrument(skip(self, filter), fields(page = filter.page, limit = filter.limit))]
    pub async fn list(
        &self,
        filter: &ApartmentFilter,
    ) -> Result<Paginated<ApartmentRecord>, ApartmentError> {
        let query = ListingQuery::from_filter(filter);
        let cache_key = query.cache_key();

        if let Some(key) = &cache_key
            && let Some(hit) = self.cached::<Paginated<ApartmentRecord>>(key)
        {
            return Ok(hit);
        }

        let page = self
            .reader
            .list_apartments(&query)
            .await
            .map_err(|err| ApartmentError::from_repo(err, None))?;
        let result = Paginated::new(page.items, page.total, query.page, query.limit);

        if let Some(key) = cache_key {
            self.write_back(key, &result);
        }
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<ApartmentRecord, ApartmentError> {
        let key = CacheKey::Entity(id);
        if let Some(hit) = self.cached::<ApartmentRecord>(&key) {
            return Ok(hit);
        }

        let record = self
            .reader
            .find_by_id(id)
            .await
            .map_err(|err| ApartmentError::from_repo(err, Some(id)))?
            .ok_or(ApartmentError::NotFound { id })?;

        self.write_back(key, &record);
        Ok(record)
    }

    #[instrument(skip(self, command), fields(project = %command.project, unit_number = %command.unit_number))]
    pub async fn create(
        &self,
        command: CreateApartmentCommand,
    ) -> Result<ApartmentRecord, ApartmentError> {
        let params = create_params(command)?;
        let record = self
            .writer
            .create_apartment(params)
            .await
            .map_err(|err| ApartmentError::from_repo(err, None))?;

        self.cache.invalidate_locations();
        self.cache.invalidate_listings();

        info!(
            target = "apartments::service",
            apartment_id = %record.id,
            "Created apartment"
        );
        Ok(record)
    }

    #[instrument(skip(self, command))]
    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateApartmentCommand,
    ) -> Result<ApartmentRecord, ApartmentError> {
        let params = update_params(id, command)?;
        let location_changed = params.location.is_some();

        let record = self
            .writer
            .update_apartment(params)
            .await
            .map_err(|err| ApartmentError::from_repo(err, Some(id)))?
            .ok_or(ApartmentError::NotFound { id })?;

        self.cache.invalidate_entity(id);
        self.cache.invalidate_listings();
        if location_changed {
            self.cache.invalidate_locations();
        }

        info!(
            target = "apartments::service",
            apartment_id = %id,
            location_changed,
            "Updated apartment"
        );
        Ok(record)
    }

    /// Returns whether a row was removed. Cached state is dropped either way.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, ApartmentError> {
        let removed = self
            .writer
            .delete_apartment(id)
            .await
            .map_err(|err| ApartmentError::from_repo(err, Some(id)))?;

        self.cache.invalidate_entity(id);
        self.cache.invalidate_locations();
        self.cache.invalidate_listings();

        info!(
            target = "apartments::service",
            apartment_id = %id,
            removed,
            "Deleted apartment"
        );
        Ok(removed)
    }

    /// Distinct locations in alphabetical order.
    #[instrument(skip(self))]
    pub async fn popular_locations(&self) -> Result<Vec<String>, ApartmentError> {
        let key = CacheKey::PopularLocations;
        if let Some(hit) = self.cached::<Vec<String>>(&key) {
            return Ok(hit);
        }

        let counts = self
            .reader
            .location_counts()
            .await
            .map_err(|err| ApartmentError::from_repo(err, None))?;
        let locations = alphabetical_locations(counts);

        self.write_back(key, &locations);
        Ok(locations)
    }

    /// Uncached free-text lookup; a blank term yields no results.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        term: &str,
        limit: Option<u32>,
    ) -> Result<Vec<ApartmentRecord>, ApartmentError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_LIMIT);
        self.reader
            .search_apartments(term, limit)
            .await
            .map_err(|err| ApartmentError::from_repo(err, None))
    }

    fn cached<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        match self.cache.get_json(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    target = "apartments::service",
                    key = err.key(),
                    error = %err,
                    "Ignoring unreadable cache entry"
                );
                None
            }
        }
    }

    fn write_back<T: Serialize>(&self, key: CacheKey, value: &T) {
        if let Err(err) = self.cache.put_json(key, value) {
            warn!(
                target = "apartments::service",
                key = err.key(),
                error = %err,
                "Skipping cache write-back"
            );
        }
    }
}

/// Case-insensitive alphabetical order, exact spelling breaking ties, so the
/// result does not depend on the store's collation.
fn alphabetical_locations(counts: Vec<LocationCount>) -> Vec<String> {
    let mut locations: Vec<String> = counts.into_iter().map(|entry| entry.location).collect();
    locations.sort_by_cached_key(|location| (location.to_lowercase(), location.clone()));
    locations
}

fn create_params(command: CreateApartmentCommand) -> Result<CreateApartmentParams, ApartmentError> {
    let description = match command.description.as_deref() {
        Some(text) => Some(rules::description(text)?),
        None => None,
    };
    Ok(CreateApartmentParams {
        unit_name: rules::unit_name(&command.unit_name)?,
        unit_number: rules::unit_number(&command.unit_number)?,
        project: rules::project(&command.project)?,
        price: rules::price(command.price)?,
        bedrooms: rules::room_count("bedrooms", command.bedrooms)?,
        bathrooms: rules::room_count("bathrooms", command.bathrooms)?,
        area_sqft: rules::area_sqft(command.area_sqft)?,
        location: rules::location(&command.location)?,
        description,
        images: rules::images(command.images.as_deref().unwrap_or_default())?,
        amenities: rules::amenities(command.amenities.as_deref().unwrap_or_default())?,
        is_available: command.is_available.unwrap_or(true),
    })
}

fn update_params(
    id: Uuid,
    command: UpdateApartmentCommand,
) -> Result<UpdateApartmentParams, ApartmentError> {
    let params = UpdateApartmentParams {
        id,
        unit_name: command.unit_name.as_deref().map(rules::unit_name).transpose()?,
        unit_number: command
            .unit_number
            .as_deref()
            .map(rules::unit_number)
            .transpose()?,
        project: command.project.as_deref().map(rules::project).transpose()?,
        price: command.price.map(rules::price).transpose()?,
        bedrooms: command
            .bedrooms
            .map(|value| rules::room_count("bedrooms", value))
            .transpose()?,
        bathrooms: command
            .bathrooms
            .map(|value| rules::room_count("bathrooms", value))
            .transpose()?,
        area_sqft: command.area_sqft.map(rules::area_sqft).transpose()?,
        location: command.location.as_deref().map(rules::location).transpose()?,
        description: command
            .description
            .as_deref()
            .map(rules::description)
            .transpose()?,
        images: command.images.as_deref().map(rules::images).transpose()?,
        amenities: command
            .amenities
            .as_deref()
            .map(rules::amenities)
            .transpose()?,
        is_available: command.is_available,
    };

    if params.is_empty() {
        return Err(ApartmentError::Validation(
            "at least one field must be provided".to_string(),
        ));
    }
    Ok(params)
}
