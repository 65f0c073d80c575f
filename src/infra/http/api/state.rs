use std::sync::Arc;

use crate::application::apartments::ApartmentService;

use super::rate_limit::ApiRateLimiter;

#[derive(Clone)]
pub struct ApiState {
    pub apartments: Arc<ApartmentService>,
    pub rate_limiter: Arc<ApiRateLimiter>,
}
