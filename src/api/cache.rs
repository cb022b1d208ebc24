use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Removed {
    pub removed: usize,
}

/// GET /api/cache/stats
async fn get_stats(State(state): State<AppState>) -> Json<ApiResponse<CacheStats>> {
    let cache = state.analysis.cache();
    Json(ApiResponse::fresh(CacheStats {
        entries: cache.len(),
        keys: cache.keys(),
    }))
}

/// DELETE /api/cache/:key
async fn delete_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<Removed>>> {
    state
        .analysis
        .cache()
        .remove(&key)
        .ok_or_else(|| AppError::NotFound(format!("No cache entry {}", key)))?;
    Ok(Json(ApiResponse::fresh(Removed { removed: 1 })))
}

/// DELETE /api/cache
async fn clear(State(state): State<AppState>) -> Json<ApiResponse<Removed>> {
    let removed = state.analysis.cache().clear();
    info!("Cleared {} cached results", removed);
    Json(ApiResponse::fresh(Removed { removed }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", delete(clear))
        .route("/stats", get(get_stats))
        .route("/:key", delete(delete_key))
}
