use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::types::SeriesError;

/// Errors raised by a single indicator computation.
///
/// These never abort sibling indicators for the same ticker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data for {indicator}: need {required} bars, have {actual}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("No option data: {0}")]
    MissingOptionData(String),
}

impl IndicatorError {
    pub fn insufficient(indicator: &'static str, required: usize, actual: usize) -> Self {
        IndicatorError::InsufficientData {
            indicator,
            required,
            actual,
        }
    }
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Indicator(IndicatorError::InsufficientData { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Indicator(IndicatorError::MissingOptionData(_)) => StatusCode::NOT_FOUND,
            AppError::Series(_) => StatusCode::BAD_REQUEST,
            AppError::SerdeJson(_) => StatusCode::BAD_REQUEST,
            AppError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Internal(msg) => {
                msg.clone()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = IndicatorError::insufficient("ema_clouds", 89, 40);
        assert_eq!(
            err.to_string(),
            "Insufficient data for ema_clouds: need 89 bars, have 40"
        );
    }

    #[test]
    fn test_status_mapping() {
        let err: AppError = IndicatorError::insufficient("squeeze", 20, 3).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err: AppError = IndicatorError::MissingOptionData("no chain".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::NotFound("AAPL".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
