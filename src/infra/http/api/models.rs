use serde::{Deserialize, Serialize};

use crate::application::apartments::{CreateApartmentCommand, UpdateApartmentCommand};
use crate::application::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, Paginated, Pagination};
use crate::application::query::ApartmentFilter;
use crate::domain::types::{SortField, SortOrder};

/// Success envelope: `{success: true, data?, pagination?, message?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: &'static str) -> Self {
        Self {
            success: true,
            data: None,
            pagination: None,
            message: Some(message),
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn page(page: Paginated<T>) -> Self {
        Self {
            success: true,
            data: Some(page.data),
            pagination: Some(page.pagination),
            message: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApartmentSearchRequest {
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_area: Option<i32>,
    pub max_area: Option<i32>,
    pub bedrooms: Option<Vec<i32>>,
    pub bathrooms: Option<Vec<i32>>,
    pub locations: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub is_available: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl ApartmentSearchRequest {
    /// Checks bounds and window, returning the filter the service runs.
    pub fn into_filter(self) -> Result<ApartmentFilter, String> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        if page < 1 {
            return Err("page must be at least 1".to_string());
        }
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(format!("limit must be between 1 and {MAX_LIMIT}"));
        }

        check_bound("minPrice", self.min_price.map(|value| value >= 0.0))?;
        check_bound("maxPrice", self.max_price.map(|value| value >= 0.0))?;
        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && max < min
        {
            return Err("Maximum price must be greater than minimum price".to_string());
        }

        check_bound("minArea", self.min_area.map(|value| value >= 0))?;
        check_bound("maxArea", self.max_area.map(|value| value >= 0))?;
        if let (Some(min), Some(max)) = (self.min_area, self.max_area)
            && max < min
        {
            return Err("Maximum area must be greater than minimum area".to_string());
        }

        let bedrooms = self.bedrooms.unwrap_or_default();
        let bathrooms = self.bathrooms.unwrap_or_default();
        if bedrooms.iter().chain(bathrooms.iter()).any(|count| *count < 0) {
            return Err("room counts cannot be negative".to_string());
        }

        Ok(ApartmentFilter {
            search: self.search,
            min_price: self.min_price,
            max_price: self.max_price,
            min_area: self.min_area,
            max_area: self.max_area,
            bedrooms,
            bathrooms,
            locations: self.locations.unwrap_or_default(),
            amenities: self.amenities.unwrap_or_default(),
            is_available: self.is_available,
            page,
            limit,
            sort_field: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
        })
    }
}

fn check_bound(field: &str, valid: Option<bool>) -> Result<(), String> {
    match valid {
        Some(false) => Err(format!("{field} cannot be negative")),
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApartmentCreateRequest {
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

impl From<ApartmentCreateRequest> for CreateApartmentCommand {
    fn from(request: ApartmentCreateRequest) -> Self {
        Self {
            unit_name: request.unit_name,
            unit_number: request.unit_number,
            project: request.project,
            price: request.price,
            bedrooms: request.bedrooms,
            bathrooms: request.bathrooms,
            area_sqft: request.area_sqft,
            location: request.location,
            description: request.description,
            images: request.images,
            amenities: request.amenities,
            is_available: request.is_available,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApartmentUpdateRequest {
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

impl From<ApartmentUpdateRequest> for UpdateApartmentCommand {
    fn from(request: ApartmentUpdateRequest) -> Self {
        Self {
            unit_name: request.unit_name,
            unit_number: request.unit_number,
            project: request.project,
            price: request.price,
            bedrooms: request.bedrooms,
            bathrooms: request.bathrooms,
            area_sqft: request.area_sqft,
            location: request.location,
            description: request.description,
            images: request.images,
            amenities: request.amenities,
            is_available: request.is_available,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuickSearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}
