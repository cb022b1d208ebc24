use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::services::normalize_symbol;
use crate::types::{OptionQuote, PriceBar, PriceSeries};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub symbol: String,
    pub count: usize,
}

/// PUT /api/series/:ticker
async fn put_series(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Json(bars): Json<Vec<PriceBar>>,
) -> Result<Json<ApiResponse<IngestResponse>>> {
    let symbol = normalize_symbol(&ticker);
    if symbol.is_empty() {
        return Err(AppError::BadRequest("Ticker must not be empty".to_string()));
    }
    if bars.is_empty() {
        return Err(AppError::BadRequest(format!("No bars supplied for {}", symbol)));
    }

    let series = PriceSeries::new(symbol.clone(), bars)?;
    let count = series.len();
    state.analysis.ingest_series(series);

    Ok(Json(ApiResponse::fresh(IngestResponse { symbol, count })))
}

/// PUT /api/options/:ticker
async fn put_options(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Json(quotes): Json<Vec<OptionQuote>>,
) -> Result<Json<ApiResponse<IngestResponse>>> {
    let symbol = normalize_symbol(&ticker);
    if symbol.is_empty() {
        return Err(AppError::BadRequest("Ticker must not be empty".to_string()));
    }
    if let Some(q) = quotes.iter().find(|q| !q.strike.is_finite() || q.strike <= 0.0) {
        return Err(AppError::BadRequest(format!("Invalid strike {}", q.strike)));
    }

    let count = quotes.len();
    state.analysis.ingest_options(&symbol, quotes);

    Ok(Json(ApiResponse::fresh(IngestResponse { symbol, count })))
}

/// GET /api/history/:ticker
async fn get_history(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    let history = state.analysis.history(&ticker)?;
    Ok(Json(ApiResponse::fresh(history)))
}

/// GET /api/symbols
async fn get_symbols(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::fresh(state.store.symbols()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/series/:ticker", put(put_series))
        .route("/api/options/:ticker", put(put_options))
        .route("/api/history/:ticker", get(get_history))
        .route("/api/symbols", get(get_symbols))
}
