//! HTTP surface: router assembly, health probe and shared middleware.

pub mod api;
mod middleware;

pub use api::rate_limit::ApiRateLimiter;
pub use api::ApiState;
pub use middleware::{REQUEST_ID_HEADER, RequestContext};

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, FromRef, State};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, middleware as axum_middleware, routing::get};
use serde::Serialize;
use time::OffsetDateTime;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::warn;

use crate::application::error::ErrorReport;
use crate::application::repos::{HealthProbe, RepoError};
use crate::config::ServerSettings;

use api::error::ApiError;
use middleware::{log_responses, set_request_context};

const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct RouterState {
    pub api: ApiState,
    pub health: Arc<dyn HealthProbe>,
    pub info: ServiceInfo,
}

impl FromRef<RouterState> for ApiState {
    fn from_ref(state: &RouterState) -> Self {
        state.api.clone()
    }
}

/// Process facts reported by `/health`.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub environment: String,
    pub started_at: Instant,
}

impl ServiceInfo {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            started_at: Instant::now(),
        }
    }
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self::new("development")
    }
}

/// Transport-level policy applied around every route.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Exact origins allowed for credentialed cross-origin requests.
    pub cors_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl From<&ServerSettings> for HttpOptions {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            cors_origins: settings.cors_origins.clone(),
            body_limit_bytes: settings.body_limit_bytes,
        }
    }
}

/// Full application router: `/health`, the `/api/v1` surface and a JSON 404.
///
/// CORS sits outermost so preflight requests are answered before rate
/// limiting or routing.
pub fn build_router(state: RouterState, options: &HttpOptions) -> Router {
    let api = api::build_api_router(state.clone());

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(options.body_limit_bytes))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&options.cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    target = "apartments::http",
                    origin = %origin,
                    error = %err,
                    "Ignoring unusable CORS origin"
                );
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([
            HeaderName::from_static(REQUEST_ID_HEADER),
            header::RETRY_AFTER,
        ])
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    /// Seconds since `ServiceInfo` was created at startup.
    uptime: f64,
    environment: String,
}

async fn health(State(state): State<RouterState>) -> Response {
    health_response(state.health.health_check().await, &state.info)
}

fn health_response(result: Result<(), RepoError>, info: &ServiceInfo) -> Response {
    let (status, label) = match &result {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
    };
    let body = HealthBody {
        status: label,
        timestamp: OffsetDateTime::now_utc(),
        uptime: info.started_at.elapsed().as_secs_f64(),
        environment: info.environment.clone(),
    };

    let mut response = (status, Json(body)).into_response();
    if let Err(err) = result {
        ErrorReport::from_error("infra::http::db_health", status, &err).attach(&mut response);
    }
    response
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found("Route not found", Some(format!("no route for {}", uri.path())))
}
