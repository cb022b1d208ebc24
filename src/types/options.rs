use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single put quote from an option chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionQuote {
    pub strike: f64,
    #[serde(default)]
    pub bid: f64,
    #[serde(default)]
    pub ask: f64,
    #[serde(default)]
    pub last_price: f64,
    /// Implied volatility as a decimal fraction (0.45 = 45%).
    #[serde(default)]
    pub implied_volatility: f64,
    #[serde(default)]
    pub open_interest: u64,
    pub expiry: NaiveDate,
}

/// A put ranked by distance from the target delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaCandidate {
    pub strike: f64,
    pub delta: f64,
    pub bid: f64,
    pub ask: f64,
    pub last_price: f64,
    pub implied_volatility: f64,
    pub open_interest: u64,
    /// Premium over strike, percent.
    pub roi: f64,
    /// `roi` scaled to a 365-day year.
    pub roi_annual: f64,
}

/// Cash-secured-put metrics for the put nearest the target delta.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CspMetrics {
    pub symbol: String,
    pub spot: f64,
    pub expiry: NaiveDate,
    pub dte: i64,
    pub target_delta: f64,
    pub best: DeltaCandidate,
    /// Up to five puts nearest the target delta, best first.
    pub candidates: Vec<DeltaCandidate>,
    pub hv30: Option<f64>,
    pub iv_hv_ratio: Option<f64>,
}
