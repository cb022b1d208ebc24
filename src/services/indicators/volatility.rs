//! Historical volatility and its rank within a trailing window.

use super::series::rolling_std;
use super::Indicator;
use crate::config::VolatilityParams;
use crate::error::IndicatorError;
use crate::types::{finite, round_to, PriceSeries, VolatilityReport};

const TRADING_DAYS: f64 = 252.0;
const MIN_BARS: usize = 60;

/// Annualized rolling volatility of log returns, in percent. NaN until the
/// window fills.
pub fn historical_volatility(closes: &[f64], window: usize) -> Vec<f64> {
    let returns: Vec<f64> = (0..closes.len())
        .map(|i| {
            if i == 0 {
                f64::NAN
            } else {
                (closes[i] / closes[i - 1]).ln()
            }
        })
        .collect();

    rolling_std(&returns, window)
        .into_iter()
        .map(|sd| sd * TRADING_DAYS.sqrt() * 100.0)
        .collect()
}

/// Min-max percentile of `current` within `history` (0-100).
///
/// A degenerate range (max == min) ranks at 50.
pub fn percentile_rank(current: f64, history: &[f64]) -> f64 {
    let min = history.iter().copied().fold(f64::NAN, f64::min);
    let max = history.iter().copied().fold(f64::NAN, f64::max);
    let span = max - min;

    if !span.is_finite() || span == 0.0 {
        return 50.0;
    }
    ((current - min) / span * 100.0).clamp(0.0, 100.0)
}

/// Latest HV over `window` bars, if defined.
pub fn latest_hv(series: &PriceSeries, window: usize) -> Option<f64> {
    historical_volatility(&series.closes(), window)
        .last()
        .copied()
        .and_then(finite)
}

/// Historical volatility ranking.
#[derive(Debug, Clone, Default)]
pub struct HistoricalVolatility {
    params: VolatilityParams,
}

impl HistoricalVolatility {
    pub fn new(params: VolatilityParams) -> Self {
        Self { params }
    }
}

impl Indicator for HistoricalVolatility {
    type Output = VolatilityReport;

    fn id(&self) -> &'static str {
        "historical_volatility"
    }

    fn min_periods(&self) -> usize {
        MIN_BARS.max(self.params.hv_window + 1)
    }

    fn calculate(&self, series: &PriceSeries) -> Result<VolatilityReport, IndicatorError> {
        self.ensure_len(series)?;

        let hv = historical_volatility(&series.closes(), self.params.hv_window);
        let start = hv.len().saturating_sub(self.params.rank_window);
        let trailing: Vec<f64> = hv[start..].iter().copied().filter(|v| v.is_finite()).collect();

        let current = hv.last().copied().and_then(finite);
        let rank = current.map(|c| percentile_rank(c, &trailing));
        let min = finite(trailing.iter().copied().fold(f64::NAN, f64::min));
        let max = finite(trailing.iter().copied().fold(f64::NAN, f64::max));

        Ok(VolatilityReport {
            symbol: series.symbol().to_string(),
            hv_current: current.map(|v| round_to(v, 2)),
            hv_rank: rank.map(|v| round_to(v, 1)),
            hv_min: min.map(|v| round_to(v, 2)),
            hv_max: max.map(|v| round_to(v, 2)),
            iv_current: None,
            iv_hv_ratio: None,
        })
    }
}
