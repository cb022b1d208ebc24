use crate::api::ApiResponse;
use crate::config::MysticPulseParams;
use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Upper bound on user-supplied smoothing lengths.
const MAX_LENGTH: usize = 500;
const MAX_BATCH: usize = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MysticPulseQuery {
    pub adx_length: Option<usize>,
    pub smoothing_factor: Option<usize>,
}

impl MysticPulseQuery {
    /// Merge overrides into the configured defaults.
    fn params(&self, defaults: MysticPulseParams) -> Result<MysticPulseParams> {
        let adx_length = self.adx_length.unwrap_or(defaults.adx_length);
        let smoothing_factor = self.smoothing_factor.unwrap_or(defaults.smoothing_factor);
        for (name, value) in [("adxLength", adx_length), ("smoothingFactor", smoothing_factor)] {
            if value == 0 || value > MAX_LENGTH {
                return Err(AppError::BadRequest(format!(
                    "{} must be between 1 and {}",
                    name, MAX_LENGTH
                )));
            }
        }

        Ok(MysticPulseParams {
            adx_length,
            smoothing_factor,
            ..defaults
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsOfQuery {
    /// Valuation date for option-derived fields; defaults to today (UTC).
    pub as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    fn date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub tickers: Vec<String>,
}

/// GET /api/mystic-pulse/:ticker
async fn get_mystic_pulse(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<MysticPulseQuery>,
) -> Result<Json<ApiResponse<Value>>> {
    let params = query.params(state.analysis.config().mystic_pulse)?;
    let (data, cached) = state.analysis.mystic_pulse(&ticker, params)?;
    Ok(Json(ApiResponse::new(data, cached)))
}

/// GET /api/squeeze/:ticker
async fn get_squeeze(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    let (data, cached) = state.analysis.squeeze(&ticker)?;
    Ok(Json(ApiResponse::new(data, cached)))
}

/// GET /api/ema-clouds/:ticker
async fn get_ema_clouds(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    let (data, cached) = state.analysis.ema_clouds(&ticker)?;
    Ok(Json(ApiResponse::new(data, cached)))
}

/// GET /api/volatility/:ticker
async fn get_volatility(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<ApiResponse<Value>>> {
    let (data, cached) = state.analysis.volatility(&ticker, query.date())?;
    Ok(Json(ApiResponse::new(data, cached)))
}

/// GET /api/csp-metrics/:ticker
async fn get_csp_metrics(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<ApiResponse<Value>>> {
    let (data, cached) = state.analysis.csp_metrics(&ticker, query.date())?;
    Ok(Json(ApiResponse::new(data, cached)))
}

/// GET /api/indicators/:ticker
async fn get_overview(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<ApiResponse<Value>>> {
    let data = state.analysis.overview(&ticker, query.date())?;
    Ok(Json(ApiResponse::fresh(data)))
}

/// GET /api/analyze/:ticker
async fn get_analyze(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    let (data, cached) = state.analysis.snapshot(&ticker)?;
    Ok(Json(ApiResponse::new(data, cached)))
}

/// POST /api/analyze-batch
async fn post_analyze_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<ApiResponse<Vec<Value>>>> {
    if request.tickers.is_empty() {
        return Err(AppError::BadRequest("No tickers supplied".to_string()));
    }
    if request.tickers.len() > MAX_BATCH {
        return Err(AppError::BadRequest(format!(
            "At most {} tickers per batch",
            MAX_BATCH
        )));
    }

    let results = state.analysis.snapshot_batch(&request.tickers);
    Ok(Json(ApiResponse::fresh(results)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/mystic-pulse/:ticker", get(get_mystic_pulse))
        .route("/api/squeeze/:ticker", get(get_squeeze))
        .route("/api/ema-clouds/:ticker", get(get_ema_clouds))
        .route("/api/volatility/:ticker", get(get_volatility))
        .route("/api/csp-metrics/:ticker", get(get_csp_metrics))
        .route("/api/indicators/:ticker", get(get_overview))
        .route("/api/analyze/:ticker", get(get_analyze))
        .route("/api/analyze-batch", post(post_analyze_batch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mystic_pulse_query_defaults() {
        let params = MysticPulseQuery::default()
            .params(MysticPulseParams::default())
            .unwrap();
        assert_eq!(params, MysticPulseParams::default());
    }

    #[test]
    fn test_mystic_pulse_query_overrides() {
        let query = MysticPulseQuery {
            adx_length: Some(14),
            smoothing_factor: Some(3),
        };
        let params = query.params(MysticPulseParams::default()).unwrap();
        assert_eq!(params.adx_length, 14);
        assert_eq!(params.smoothing_factor, 3);
        assert_eq!(params.collect_length, 100);
    }

    #[test]
    fn test_mystic_pulse_query_rejects_zero() {
        let query = MysticPulseQuery {
            adx_length: Some(0),
            smoothing_factor: None,
        };
        assert!(matches!(
            query.params(MysticPulseParams::default()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_as_of_parses_iso_date() {
        let query: AsOfQuery = serde_json::from_str(r#"{"asOf":"2024-06-03"}"#).unwrap();
        assert_eq!(query.date(), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
    }
}
