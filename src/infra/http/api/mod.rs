pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::infra::http::RouterState;

pub fn build_api_router(state: RouterState) -> Router<RouterState> {
    let rate_state = state.clone();

    Router::new()
        .route("/api/v1/apartments", post(handlers::create_apartment))
        .route(
            "/api/v1/apartments/search",
            post(handlers::search_apartments),
        )
        .route(
            "/api/v1/apartments/locations",
            get(handlers::popular_locations),
        )
        .route(
            "/api/v1/apartments/quick-search",
            get(handlers::quick_search),
        )
        .route(
            "/api/v1/apartments/{id}",
            get(handlers::get_apartment)
                .put(handlers::update_apartment)
                .delete(handlers::delete_apartment),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            rate_state,
            middleware::api_rate_limit,
        ))
}
