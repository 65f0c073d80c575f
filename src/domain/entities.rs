//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A single listed unit.
///
/// Serialized in camelCase because the same representation is returned by the
/// API and stored as the cached value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentRecord {
    pub id: Uuid,
    pub unit_name: String,
    pub unit_number: String,
    pub project: String,
    pub price: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqft: i32,
    pub location: String,
    /// Always present on the wire, `null` when unset.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub is_available: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ApartmentRecord {
    /// True when every requested amenity is present on this unit.
    pub fn has_all_amenities<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required
            .iter()
            .all(|wanted| self.amenities.iter().any(|have| have == wanted.as_ref()))
    }
}

/// A distinct location together with the number of units listed there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCount {
    pub location: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ApartmentRecord {
        let now = OffsetDateTime::UNIX_EPOCH;
        ApartmentRecord {
            id: Uuid::nil(),
            unit_name: "Garden Studio".to_string(),
            unit_number: "G-01".to_string(),
            project: "Palm Residences".to_string(),
            price: 450_000.0,
            bedrooms: 0,
            bathrooms: 1,
            area_sqft: 520,
            location: "Palm Jumeirah".to_string(),
            description: None,
            images: Vec::new(),
            amenities: vec!["Pool".to_string()],
            is_available: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn missing_description_serializes_as_null() {
        let json = serde_json::to_value(record()).expect("serialize");
        let object = json.as_object().expect("object");
        assert!(object.contains_key("description"));
        assert!(json["description"].is_null());
        assert_eq!(json["areaSqft"], 520);
        assert_eq!(json["createdAt"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn amenity_match_requires_every_tag() {
        let unit = record();
        assert!(unit.has_all_amenities::<&str>(&[]));
        assert!(unit.has_all_amenities(&["Pool"]));
        assert!(!unit.has_all_amenities(&["Pool", "Gym"]));
    }
}
