pub mod cache;
pub mod health;
pub mod indicators;
pub mod market;

use crate::AppState;
use axum::Router;
use serde::Serialize;

/// API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ApiMeta,
}

#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// True when the result was served from the indicator cache.
    pub cached: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, cached: bool) -> Self {
        Self {
            data,
            meta: ApiMeta { cached },
        }
    }

    pub fn fresh(data: T) -> Self {
        Self::new(data, false)
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(market::router())
        .merge(indicators::router())
        .nest("/api/cache", cache::router())
}
