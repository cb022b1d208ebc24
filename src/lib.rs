//! StockPulse - technical-analysis indicator server for equities

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod types;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use services::{AnalysisService, MarketDataStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<MarketDataStore>,
    pub analysis: Arc<AnalysisService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = MarketDataStore::new();
        let analysis = AnalysisService::new(store.clone(), config.indicators.clone());
        Self {
            config: Arc::new(config),
            store,
            analysis,
        }
    }
}

/// Build the HTTP application.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Re-export commonly used types
pub use types::*;
pub use services::Cache;
