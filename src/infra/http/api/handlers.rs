//! Apartment route handlers.
//!
//! Handlers translate HTTP payloads into service calls and map
//! [`ApartmentError`] onto the error envelope in one place.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::error;
use uuid::Uuid;

use crate::application::apartments::ApartmentError;
use crate::application::repos::RepoError;

use super::error::{ApiError, codes};
use super::models::{
    ApartmentCreateRequest, ApartmentSearchRequest, ApartmentUpdateRequest, ApiResponse,
    QuickSearchQuery,
};
use super::state::ApiState;

pub(crate) fn apartment_to_api(source: &'static str, err: ApartmentError) -> ApiError {
    match err {
        ApartmentError::NotFound { id } => {
            ApiError::not_found("Apartment not found", Some(format!("no apartment with id {id}")))
        }
        ApartmentError::Conflict { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::CONFLICT,
            "An apartment with this unit number already exists in the project",
            Some(constraint),
        ),
        ApartmentError::Validation(message) => {
            ApiError::bad_request("Validation failed", Some(message))
        }
        ApartmentError::Storage(repo) => {
            error!(
                target = "apartments::api",
                source,
                error = %repo,
                "apartment storage failure"
            );
            storage_to_api(repo)
        }
    }
}

fn storage_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database operation timed out",
            None,
        )
        .with_detail("database timeout"),
        other => ApiError::internal(codes::DATABASE, "Database operation failed")
            .with_detail(other.to_string()),
    }
}

fn body_rejection(rejection: JsonRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            codes::PAYLOAD_TOO_LARGE,
            "Request body too large",
            None,
        )
        .with_detail(rejection.body_text());
    }
    ApiError::bad_request("Invalid request body", Some(rejection.body_text()))
}

fn path_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::bad_request("Invalid apartment id", Some(rejection.body_text())))
}

pub async fn search_apartments(
    State(state): State<ApiState>,
    payload: Result<Json<ApartmentSearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(body_rejection)?;
    let filter = request
        .into_filter()
        .map_err(|message| ApiError::bad_request("Validation failed", Some(message)))?;

    let page = state
        .apartments
        .list(&filter)
        .await
        .map_err(|err| apartment_to_api("search_apartments", err))?;

    Ok(Json(ApiResponse::page(page)))
}

pub async fn get_apartment(
    State(state): State<ApiState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(path)?;
    let apartment = state
        .apartments
        .get(id)
        .await
        .map_err(|err| apartment_to_api("get_apartment", err))?;

    Ok(Json(ApiResponse::data(apartment)))
}

pub async fn create_apartment(
    State(state): State<ApiState>,
    payload: Result<Json<ApartmentCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(body_rejection)?;
    let apartment = state
        .apartments
        .create(request.into())
        .await
        .map_err(|err| apartment_to_api("create_apartment", err))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(apartment).with_message("Apartment created successfully")),
    ))
}

pub async fn update_apartment(
    State(state): State<ApiState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ApartmentUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(path)?;
    let Json(request) = payload.map_err(body_rejection)?;
    let apartment = state
        .apartments
        .update(id, request.into())
        .await
        .map_err(|err| apartment_to_api("update_apartment", err))?;

    Ok(Json(
        ApiResponse::data(apartment).with_message("Apartment updated successfully"),
    ))
}

pub async fn delete_apartment(
    State(state): State<ApiState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(path)?;
    let removed = state
        .apartments
        .delete(id)
        .await
        .map_err(|err| apartment_to_api("delete_apartment", err))?;

    if !removed {
        return Err(apartment_to_api(
            "delete_apartment",
            ApartmentError::NotFound { id },
        ));
    }

    Ok(Json(ApiResponse::message("Apartment deleted successfully")))
}

pub async fn popular_locations(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let locations = state
        .apartments
        .popular_locations()
        .await
        .map_err(|err| apartment_to_api("popular_locations", err))?;

    Ok(Json(ApiResponse::data(locations)))
}

pub async fn quick_search(
    State(state): State<ApiState>,
    query: Result<Query<QuickSearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::bad_request("Invalid query string", Some(rejection.body_text()))
    })?;
    let term = query.q.unwrap_or_default();
    let apartments = state
        .apartments
        .search(&term, query.limit)
        .await
        .map_err(|err| apartment_to_api("quick_search", err))?;

    Ok(Json(ApiResponse::data(apartments)))
}
