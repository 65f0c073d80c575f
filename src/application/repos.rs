//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::application::query::ListingQuery;
use crate::domain::entities::{ApartmentRecord, LocationCount};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateApartmentParams {
    pub unit_name: String,
    pub unit_number: String,
    pub project: String,
    pub price: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqft: i32,
    pub location: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub is_available: bool,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateApartmentParams {
    pub id: Uuid,
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

impl UpdateApartmentParams {
    pub fn is_empty(&self) -> bool {
        self.unit_name.is_none()
            && self.unit_number.is_none()
            && self.project.is_none()
            && self.price.is_none()
            && self.bedrooms.is_none()
            && self.bathrooms.is_none()
            && self.area_sqft.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.images.is_none()
            && self.amenities.is_none()
            && self.is_available.is_none()
    }

    /// Copies the supplied fields onto `record`; timestamps are left to the caller.
    pub fn apply_to(&self, record: &mut ApartmentRecord) {
        if let Some(value) = &self.unit_name {
            record.unit_name = value.clone();
        }
        if let Some(value) = &self.unit_number {
            record.unit_number = value.clone();
        }
        if let Some(value) = &self.project {
            record.project = value.clone();
        }
        if let Some(value) = self.price {
            record.price = value;
        }
        if let Some(value) = self.bedrooms {
            record.bedrooms = value;
        }
        if let Some(value) = self.bathrooms {
            record.bathrooms = value;
        }
        if let Some(value) = self.area_sqft {
            record.area_sqft = value;
        }
        if let Some(value) = &self.location {
            record.location = value.clone();
        }
        if let Some(value) = &self.description {
            record.description = Some(value.clone());
        }
        if let Some(value) = &self.images {
            record.images = value.clone();
        }
        if let Some(value) = &self.amenities {
            record.amenities = value.clone();
        }
        if let Some(value) = self.is_available {
            record.is_available = value;
        }
    }
}

/// Rows of one page together with the total matching count.
#[derive(Debug, Clone, Default)]
pub struct ApartmentPage {
    pub items: Vec<ApartmentRecord>,
    pub total: u64,
}

#[async_trait]
pub trait ApartmentsRepo: Send + Sync {
    /// Page and total count, read atomically.
    async fn list_apartments(&self, query: &ListingQuery) -> Result<ApartmentPage, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApartmentRecord>, RepoError>;

    async fn location_counts(&self) -> Result<Vec<LocationCount>, RepoError>;

    /// Free-text match on the text columns, newest first.
    async fn search_apartments(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<ApartmentRecord>, RepoError>;
}

#[async_trait]
pub trait ApartmentsWriteRepo: Send + Sync {
    async fn create_apartment(
        &self,
        params: CreateApartmentParams,
    ) -> Result<ApartmentRecord, RepoError>;

    /// Returns `None` when no row has the given id.
    async fn update_apartment(
        &self,
        params: UpdateApartmentParams,
    ) -> Result<Option<ApartmentRecord>, RepoError>;

    /// Returns whether a row was removed.
    async fn delete_apartment(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn health_check(&self) -> Result<(), RepoError>;
}
