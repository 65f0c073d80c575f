//! Loading sample apartments from a TOML file.
//!
//! ```toml
//! [[apartments]]
//! unit_name = "Sky Penthouse Apartment"
//! unit_number = "AP-001"
//! project = "Marina Heights"
//! price = 2500000
//! bedrooms = 4
//! bathrooms = 3
//! area_sqft = 3500
//! location = "Dubai Marina"
//! amenities = ["Pool", "Gym"]
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::application::apartments::{ApartmentError, ApartmentService, CreateApartmentCommand};
use crate::application::error::AppError;
use crate::infra::error::InfraError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedFile {
    #[serde(default)]
    apartments: Vec<SeedApartment>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedApartment {
    unit_name: String,
    unit_number: String,
    project: String,
    price: f64,
    bedrooms: i32,
    bathrooms: i32,
    area_sqft: i32,
    location: String,
    description: Option<String>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    amenities: Vec<String>,
    is_available: Option<bool>,
}

impl From<SeedApartment> for CreateApartmentCommand {
    fn from(seed: SeedApartment) -> Self {
        Self {
            unit_name: seed.unit_name,
            unit_number: seed.unit_number,
            project: seed.project,
            price: seed.price,
            bedrooms: seed.bedrooms,
            bathrooms: seed.bathrooms,
            area_sqft: seed.area_sqft,
            location: seed.location,
            description: seed.description,
            images: Some(seed.images),
            amenities: Some(seed.amenities),
            is_available: seed.is_available,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

pub fn parse_seed(data: &str) -> Result<Vec<CreateApartmentCommand>, AppError> {
    let file: SeedFile = toml::from_str(data)
        .map_err(|err| AppError::validation(format!("invalid seed file: {err}")))?;
    Ok(file.apartments.into_iter().map(Into::into).collect())
}

pub async fn seed_from_path(
    service: &ApartmentService,
    path: &Path,
) -> Result<SeedReport, AppError> {
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| AppError::from(InfraError::Io(err)))?;
    let commands = parse_seed(&data)?;
    seed_apartments(service, commands).await
}

/// Creates each apartment in order. Units that already exist are skipped.
pub async fn seed_apartments(
    service: &ApartmentService,
    commands: Vec<CreateApartmentCommand>,
) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();
    for command in commands {
        let project = command.project.clone();
        let unit_number = command.unit_number.clone();
        match service.create(command).await {
            Ok(_) => report.created += 1,
            Err(ApartmentError::Conflict { constraint }) => {
                warn!(
                    target = "apartments::seed",
                    project = %project,
                    unit_number = %unit_number,
                    constraint = %constraint,
                    "Skipping existing apartment"
                );
                report.skipped += 1;
            }
            Err(err) => return Err(AppError::from(err)),
        }
    }

    info!(
        target = "apartments::seed",
        created = report.created,
        skipped = report.skipped,
        "Seeding finished"
    );
    Ok(report)
}
