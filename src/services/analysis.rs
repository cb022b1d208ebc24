//! Per-ticker indicator orchestration.
//!
//! Pulls inputs from the [`MarketDataStore`], runs each indicator
//! independently and memoizes serialized results in a keyed [`Cache`].

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::cache::Cache;
use super::indicators::volatility::latest_hv;
use super::indicators::{
    EmaClouds, HistoricalVolatility, Indicator, MysticPulse, SnapshotAnalyzer, SqueezeMomentum,
};
use super::market_data::{normalize_symbol, MarketDataStore};
use super::options::{expiries, near_the_money_iv, select_expiry, OptionsService};
use crate::config::{IndicatorConfig, MysticPulseParams, VolatilityParams};
use crate::error::{AppError, IndicatorError, Result};
use crate::types::{round_to, CspMetrics, OptionQuote, PriceSeries, VolatilityReport};

const CSP_MIN_BARS: usize = 20;

/// Implied volatility (percent) of the near-the-money put in the expiry
/// nearest the target DTE.
fn current_iv(
    quotes: &[OptionQuote],
    spot: f64,
    as_of: NaiveDate,
    params: &VolatilityParams,
) -> Option<f64> {
    let (expiry, _) = select_expiry(&expiries(quotes), as_of, params)?;
    let in_expiry: Vec<OptionQuote> = quotes.iter().filter(|q| q.expiry == expiry).cloned().collect();
    near_the_money_iv(&in_expiry, spot).map(|iv| iv * 100.0)
}

fn iv_hv_ratio(iv: Option<f64>, hv: Option<f64>) -> Option<f64> {
    match (iv, hv) {
        (Some(iv), Some(hv)) if hv > 0.0 => Some(round_to(iv / hv, 2)),
        _ => None,
    }
}

/// Attach option-implied volatility to a historical volatility report.
pub fn with_implied_volatility(
    mut report: VolatilityReport,
    quotes: Option<&[OptionQuote]>,
    spot: f64,
    as_of: NaiveDate,
    params: &VolatilityParams,
) -> VolatilityReport {
    let iv = quotes.and_then(|q| current_iv(q, spot, as_of, params));
    report.iv_current = iv.map(|v| round_to(v, 2));
    report.iv_hv_ratio = iv_hv_ratio(iv, report.hv_current);
    report
}

/// Find the put nearest the target delta and derive seller metrics.
pub fn csp_metrics(
    series: &PriceSeries,
    quotes: &[OptionQuote],
    as_of: NaiveDate,
    params: &VolatilityParams,
) -> std::result::Result<CspMetrics, IndicatorError> {
    if series.len() < CSP_MIN_BARS {
        return Err(IndicatorError::insufficient(
            "csp_metrics",
            CSP_MIN_BARS,
            series.len(),
        ));
    }
    let spot = series
        .last()
        .map(|b| b.close)
        .ok_or_else(|| IndicatorError::insufficient("csp_metrics", CSP_MIN_BARS, 0))?;

    if quotes.is_empty() {
        return Err(IndicatorError::MissingOptionData(format!(
            "no option chain for {}",
            series.symbol()
        )));
    }

    let (expiry, dte) = select_expiry(&expiries(quotes), as_of, params).ok_or_else(|| {
        IndicatorError::MissingOptionData(format!(
            "no expiry within {}-{} DTE",
            params.min_dte, params.max_dte
        ))
    })?;

    let in_expiry: Vec<OptionQuote> = quotes.iter().filter(|q| q.expiry == expiry).cloned().collect();
    let candidates = OptionsService::new(params.risk_free_rate).rank_puts(&in_expiry, spot, dte, params);
    let best = candidates.first().cloned().ok_or_else(|| {
        IndicatorError::MissingOptionData(format!("no out-of-the-money puts for {}", expiry))
    })?;

    let hv30 = latest_hv(series, params.hv_window);
    let iv = near_the_money_iv(&in_expiry, spot).map(|v| v * 100.0);

    Ok(CspMetrics {
        symbol: series.symbol().to_string(),
        spot,
        expiry,
        dte,
        target_delta: params.target_delta,
        best,
        candidates,
        hv30: hv30.map(|v| round_to(v, 2)),
        iv_hv_ratio: iv_hv_ratio(iv, hv30),
    })
}

/// Serialize a per-indicator outcome, turning failures into `{"error": ..}`.
fn outcome<T: Serialize>(indicator: &str, result: std::result::Result<T, IndicatorError>) -> Value {
    match result.map(|v| serde_json::to_value(v)) {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => json!({ "error": e.to_string() }),
        Err(e) => {
            warn!("{} failed: {}", indicator, e);
            json!({ "error": e.to_string() })
        }
    }
}

/// A memoized result tagged with the upload generation it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResult {
    pub generation: u64,
    pub value: Value,
}

/// Indicator service with result caching.
pub struct AnalysisService {
    store: Arc<MarketDataStore>,
    cache: Cache<CachedResult>,
    config: IndicatorConfig,
}

impl AnalysisService {
    pub fn new(store: Arc<MarketDataStore>, config: IndicatorConfig) -> Arc<Self> {
        Arc::new(Self {
            store,
            cache: Cache::new(),
            config,
        })
    }

    pub fn store(&self) -> &Arc<MarketDataStore> {
        &self.store
    }

    pub fn cache(&self) -> &Cache<CachedResult> {
        &self.cache
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    fn series(&self, symbol: &str) -> Result<Arc<PriceSeries>> {
        self.store
            .get_series(symbol)
            .ok_or_else(|| AppError::NotFound(format!("No price history for {}", normalize_symbol(symbol))))
    }

    /// Series plus the generation read before it. Inputs fetched after this
    /// call are at least as new as the returned generation.
    fn series_at(&self, symbol: &str) -> Result<(u64, Arc<PriceSeries>)> {
        let generation = self.store.generation(symbol);
        Ok((generation, self.series(symbol)?))
    }

    /// Return the cached blob for `key` when it was computed at `generation`,
    /// otherwise compute, store and return it. The flag is true on a hit.
    ///
    /// A result whose inputs were replaced while it was computing is never
    /// served: its generation no longer matches, and it is dropped if the
    /// upload's invalidation already ran.
    fn cached<T, F>(&self, symbol: &str, key: String, generation: u64, compute: F) -> Result<(Value, bool)>
    where
        T: Serialize,
        F: FnOnce() -> Result<T>,
    {
        if let Some(entry) = self.cache.get(&key) {
            if entry.generation == generation {
                debug!("Cache hit for {}", key);
                return Ok((entry.value, true));
            }
        }

        let value = serde_json::to_value(compute()?)?;
        self.cache.set(
            key.clone(),
            CachedResult {
                generation,
                value: value.clone(),
            },
        );
        if self.store.generation(symbol) != generation {
            debug!("Discarding {} computed from replaced inputs", key);
            self.cache.remove(&key);
        }
        Ok((value, false))
    }

    /// Drop every cached result for a ticker.
    pub fn invalidate(&self, symbol: &str) -> usize {
        let removed = self.cache.remove_prefix(&format!("{}:", normalize_symbol(symbol)));
        if removed > 0 {
            debug!("Invalidated {} cached results for {}", removed, symbol);
        }
        removed
    }

    /// Replace a ticker's series and drop its cached results.
    pub fn ingest_series(&self, series: PriceSeries) {
        let symbol = series.symbol().to_string();
        self.store.put_series(series);
        self.invalidate(&symbol);
    }

    /// Replace a ticker's put chain and drop its cached results.
    pub fn ingest_options(&self, symbol: &str, quotes: Vec<OptionQuote>) {
        self.store.put_options(symbol, quotes);
        self.invalidate(symbol);
    }

    pub fn mystic_pulse(&self, symbol: &str, params: MysticPulseParams) -> Result<(Value, bool)> {
        let (generation, series) = self.series_at(symbol)?;
        let key = format!(
            "{}:mystic_pulse:{}:{}",
            normalize_symbol(symbol),
            params.adx_length,
            params.smoothing_factor
        );
        self.cached(symbol, key, generation, || {
            debug!("Computing Mystic Pulse for {} over {} bars", symbol, series.len());
            Ok(MysticPulse::new(params).calculate(&series)?)
        })
    }

    pub fn squeeze(&self, symbol: &str) -> Result<(Value, bool)> {
        let (generation, series) = self.series_at(symbol)?;
        let key = format!("{}:squeeze", normalize_symbol(symbol));
        self.cached(symbol, key, generation, || {
            Ok(SqueezeMomentum::new(self.config.squeeze).calculate(&series)?)
        })
    }

    pub fn ema_clouds(&self, symbol: &str) -> Result<(Value, bool)> {
        let (generation, series) = self.series_at(symbol)?;
        let key = format!("{}:ema_clouds", normalize_symbol(symbol));
        self.cached(symbol, key, generation, || Ok(EmaClouds.calculate(&series)?))
    }

    fn volatility_report(&self, series: &PriceSeries, as_of: NaiveDate) -> std::result::Result<VolatilityReport, IndicatorError> {
        let params = &self.config.volatility;
        let report = HistoricalVolatility::new(*params).calculate(series)?;
        let quotes = self.store.get_options(series.symbol());
        let spot = series.last().map_or(0.0, |b| b.close);
        Ok(with_implied_volatility(
            report,
            quotes.as_deref().map(|q| q.as_slice()),
            spot,
            as_of,
            params,
        ))
    }

    /// Option-derived fields depend on `as_of`, so it is part of the key.
    pub fn volatility(&self, symbol: &str, as_of: NaiveDate) -> Result<(Value, bool)> {
        let (generation, series) = self.series_at(symbol)?;
        let key = format!("{}:volatility:{}", normalize_symbol(symbol), as_of);
        self.cached(symbol, key, generation, || Ok(self.volatility_report(&series, as_of)?))
    }

    fn csp_for(&self, series: &PriceSeries, as_of: NaiveDate) -> std::result::Result<CspMetrics, IndicatorError> {
        let quotes = self.store.get_options(series.symbol()).ok_or_else(|| {
            IndicatorError::MissingOptionData(format!("no option chain for {}", series.symbol()))
        })?;
        csp_metrics(series, &quotes, as_of, &self.config.volatility)
    }

    pub fn csp_metrics(&self, symbol: &str, as_of: NaiveDate) -> Result<(Value, bool)> {
        let (generation, series) = self.series_at(symbol)?;
        let key = format!("{}:csp:{}", normalize_symbol(symbol), as_of);
        self.cached(symbol, key, generation, || Ok(self.csp_for(&series, as_of)?))
    }

    pub fn snapshot(&self, symbol: &str) -> Result<(Value, bool)> {
        let (generation, series) = self.series_at(symbol)?;
        let key = format!("{}:snapshot", normalize_symbol(symbol));
        self.cached(symbol, key, generation, || Ok(SnapshotAnalyzer.calculate(&series)?))
    }

    /// Snapshot per ticker; failures are reported inline.
    pub fn snapshot_batch(&self, symbols: &[String]) -> Vec<Value> {
        symbols
            .iter()
            .map(|symbol| match self.snapshot(symbol) {
                Ok((value, _)) => value,
                Err(e) => {
                    warn!("Snapshot failed for {}: {}", symbol, e);
                    json!({ "symbol": normalize_symbol(symbol), "error": e.to_string() })
                }
            })
            .collect()
    }

    /// Every indicator's summary for a ticker. One indicator failing does
    /// not hide the others.
    pub fn overview(&self, symbol: &str, as_of: NaiveDate) -> Result<Value> {
        let series = self.series(symbol)?;
        let mystic = MysticPulse::new(self.config.mystic_pulse)
            .calculate(&series)
            .map(|r| r.summary);
        let squeeze = SqueezeMomentum::new(self.config.squeeze)
            .calculate(&series)
            .map(|r| r.summary);
        let clouds = EmaClouds.calculate(&series).map(|r| r.summary);

        Ok(json!({
            "symbol": series.symbol(),
            "bars": series.len(),
            "mysticPulse": outcome("mystic_pulse", mystic),
            "squeeze": outcome("squeeze_momentum", squeeze),
            "emaClouds": outcome("ema_clouds", clouds),
            "volatility": outcome("historical_volatility", self.volatility_report(&series, as_of)),
            "csp": outcome("csp_metrics", self.csp_for(&series, as_of).map(|m| m.best)),
        }))
    }

    pub fn history(&self, symbol: &str) -> Result<Value> {
        let series = self.series(symbol)?;
        let history: Vec<Value> = series
            .bars()
            .iter()
            .map(|bar| {
                json!({
                    "date": bar.date,
                    "open": round_to(bar.open, 2),
                    "high": round_to(bar.high, 2),
                    "low": round_to(bar.low, 2),
                    "close": round_to(bar.close, 2),
                    "volume": bar.volume,
                })
            })
            .collect();

        Ok(json!({ "symbol": series.symbol(), "history": history }))
    }
}
