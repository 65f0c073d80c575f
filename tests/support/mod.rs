//! In-memory repository and fixtures shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use apartments::application::apartments::{ApartmentService, CreateApartmentCommand};
use apartments::application::query::ListingQuery;
use apartments::application::repos::{
    ApartmentPage, ApartmentsRepo, ApartmentsWriteRepo, CreateApartmentParams, HealthProbe,
    RepoError, UpdateApartmentParams,
};
use apartments::cache::{ApartmentCache, CacheConfig, TtlStore};
use apartments::domain::entities::{ApartmentRecord, LocationCount};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

pub const UNIQUE_CONSTRAINT: &str = "apartments_project_unit_number_key";

/// Store double that mirrors the PostgreSQL adapter's semantics and counts
/// every call that reaches it.
#[derive(Default)]
pub struct MemoryRepo {
    rows: Mutex<Vec<ApartmentRecord>>,
    pub list_calls: AtomicUsize,
    pub find_calls: AtomicUsize,
    pub location_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    unhealthy: AtomicBool,
}

impl MemoryRepo {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn location_calls(&self) -> usize {
        self.location_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Inserts a row directly, bypassing the service and its invalidation.
    pub fn insert_raw(&self, record: ApartmentRecord) {
        self.rows.lock().unwrap().push(record);
    }
}

#[async_trait]
impl ApartmentsRepo for MemoryRepo {
    async fn list_apartments(&self, query: &ListingQuery) -> Result<ApartmentPage, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        let mut matching: Vec<ApartmentRecord> = rows
            .iter()
            .filter(|row| query.predicate.matches(row))
            .cloned()
            .collect();
        matching.sort_by(|left, right| query.sort.compare(left, right));
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok(ApartmentPage { items, total })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApartmentRecord>, RepoError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn location_counts(&self) -> Result<Vec<LocationCount>, RepoError> {
        self.location_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        let mut counts: Vec<LocationCount> = Vec::new();
        for row in rows.iter() {
            match counts.iter_mut().find(|entry| entry.location == row.location) {
                Some(entry) => entry.count += 1,
                None => counts.push(LocationCount {
                    location: row.location.clone(),
                    count: 1,
                }),
            }
        }
        Ok(counts)
    }

    async fn search_apartments(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<ApartmentRecord>, RepoError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let needle = term.to_lowercase();
        let rows = self.rows.lock().unwrap();
        let mut hits: Vec<ApartmentRecord> = rows
            .iter()
            .filter(|row| {
                [&row.unit_name, &row.unit_number, &row.project, &row.location]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        hits.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        hits.truncate(limit as usize);
        Ok(hits)
    }
}

#[async_trait]
impl ApartmentsWriteRepo for MemoryRepo {
    async fn create_apartment(
        &self,
        params: CreateApartmentParams,
    ) -> Result<ApartmentRecord, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|row| row.project == params.project && row.unit_number == params.unit_number)
        {
            return Err(RepoError::Duplicate {
                constraint: UNIQUE_CONSTRAINT.to_string(),
            });
        }

        // Strictly increasing timestamps keep the default ordering deterministic.
        let created_at = next_timestamp(&rows);
        let record = ApartmentRecord {
            id: Uuid::new_v4(),
            unit_name: params.unit_name,
            unit_number: params.unit_number,
            project: params.project,
            price: params.price,
            bedrooms: params.bedrooms,
            bathrooms: params.bathrooms,
            area_sqft: params.area_sqft,
            location: params.location,
            description: params.description,
            images: params.images,
            amenities: params.amenities,
            is_available: params.is_available,
            created_at,
            updated_at: created_at,
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn update_apartment(
        &self,
        params: UpdateApartmentParams,
    ) -> Result<Option<ApartmentRecord>, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(index) = rows.iter().position(|row| row.id == params.id) else {
            return Ok(None);
        };

        let mut updated = rows[index].clone();
        params.apply_to(&mut updated);
        if rows.iter().enumerate().any(|(other, row)| {
            other != index
                && row.project == updated.project
                && row.unit_number == updated.unit_number
        }) {
            return Err(RepoError::Duplicate {
                constraint: UNIQUE_CONSTRAINT.to_string(),
            });
        }
        updated.updated_at = OffsetDateTime::now_utc();
        rows[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_apartment(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() < before)
    }
}

#[async_trait]
impl HealthProbe for MemoryRepo {
    async fn health_check(&self) -> Result<(), RepoError> {
        if !self.unhealthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepoError::Persistence("connection refused".to_string()))
        }
    }
}

fn next_timestamp(rows: &[ApartmentRecord]) -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    match rows.iter().map(|row| row.created_at).max() {
        Some(latest) if latest >= now => latest + time::Duration::milliseconds(1),
        _ => now,
    }
}

pub struct Harness {
    pub repo: Arc<MemoryRepo>,
    pub cache: Arc<ApartmentCache>,
    pub service: Arc<ApartmentService>,
}

pub fn harness() -> Harness {
    harness_with(CacheConfig::default())
}

pub fn harness_with(config: CacheConfig) -> Harness {
    let repo = MemoryRepo::new();
    let store = Arc::new(TtlStore::new(config.default_ttl()));
    let cache = Arc::new(ApartmentCache::new(config, store));
    let service = Arc::new(ApartmentService::new(
        repo.clone(),
        repo.clone(),
        cache.clone(),
    ));
    Harness {
        repo,
        cache,
        service,
    }
}

pub fn apartment(unit_number: &str, location: &str, price: f64) -> CreateApartmentCommand {
    CreateApartmentCommand {
        unit_name: format!("Unit {unit_number}"),
        unit_number: unit_number.to_string(),
        project: "Marina Heights".to_string(),
        price,
        bedrooms: 2,
        bathrooms: 2,
        area_sqft: 1200,
        location: location.to_string(),
        description: None,
        images: None,
        amenities: None,
        is_available: None,
    }
}
