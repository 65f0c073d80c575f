//! Field rules for apartment attributes.
//!
//! Text fields are trimmed before their length is checked; the trimmed value is
//! what gets persisted.

use url::Url;

use super::error::DomainError;

pub const UNIT_NAME_MAX: usize = 100;
pub const UNIT_NUMBER_MAX: usize = 50;
pub const PROJECT_MAX: usize = 100;
pub const LOCATION_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 2000;
pub const AMENITY_MAX: usize = 100;
pub const ROOM_COUNT_MAX: i32 = 20;

pub fn unit_name(value: &str) -> Result<String, DomainError> {
    bounded_text("unitName", value, UNIT_NAME_MAX)
}

pub fn unit_number(value: &str) -> Result<String, DomainError> {
    bounded_text("unitNumber", value, UNIT_NUMBER_MAX)
}

pub fn project(value: &str) -> Result<String, DomainError> {
    bounded_text("project", value, PROJECT_MAX)
}

pub fn location(value: &str) -> Result<String, DomainError> {
    bounded_text("location", value, LOCATION_MAX)
}

pub fn price(value: f64) -> Result<f64, DomainError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::validation("price", "must be a positive number"));
    }
    Ok(value)
}

pub fn room_count(field: &'static str, value: i32) -> Result<i32, DomainError> {
    if !(0..=ROOM_COUNT_MAX).contains(&value) {
        return Err(DomainError::validation(
            field,
            format!("must be between 0 and {ROOM_COUNT_MAX}"),
        ));
    }
    Ok(value)
}

pub fn area_sqft(value: i32) -> Result<i32, DomainError> {
    if value <= 0 {
        return Err(DomainError::validation("areaSqft", "must be a positive integer"));
    }
    Ok(value)
}

/// Descriptions may be empty; only the upper bound applies.
pub fn description(value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > DESCRIPTION_MAX {
        return Err(DomainError::validation(
            "description",
            format!("must be at most {DESCRIPTION_MAX} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn images(values: &[String]) -> Result<Vec<String>, DomainError> {
    values
        .iter()
        .map(|raw| {
            let trimmed = raw.trim();
            match Url::parse(trimmed) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
                _ => Err(DomainError::validation(
                    "images",
                    format!("`{trimmed}` is not an http(s) URL"),
                )),
            }
        })
        .collect()
}

pub fn amenities(values: &[String]) -> Result<Vec<String>, DomainError> {
    values
        .iter()
        .map(|raw| bounded_text("amenities", raw, AMENITY_MAX))
        .collect()
}

fn bounded_text(field: &'static str, value: &str, max: usize) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_string())
}
