//! Latest-bar snapshot: price, RSI, Bollinger Bands and SMAs with a short
//! human-readable summary.

use super::series::{rolling_mean, rolling_std};
use super::Indicator;
use crate::error::IndicatorError;
use crate::types::{finite, round_to, PriceSeries, Snapshot, SnapshotIndicators};

const RSI_PERIOD: usize = 14;
const BB_PERIOD: usize = 20;
const BB_MULT: f64 = 2.0;

/// RSI with Wilder's smoothed averages. `None` until `period + 1` closes.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            if change > 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            }
        })
        .unzip();

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

fn last_sma(closes: &[f64], length: usize) -> Option<f64> {
    rolling_mean(closes, length).last().copied().and_then(finite)
}

fn rsi_description(rsi: Option<f64>) -> &'static str {
    match rsi {
        Some(v) if v > 70.0 => "overbought",
        Some(v) if v < 30.0 => "oversold",
        _ => "neutral",
    }
}

/// Snapshot analyzer.
#[derive(Debug, Clone, Default)]
pub struct SnapshotAnalyzer;

impl Indicator for SnapshotAnalyzer {
    type Output = Snapshot;

    fn id(&self) -> &'static str {
        "snapshot"
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn calculate(&self, series: &PriceSeries) -> Result<Snapshot, IndicatorError> {
        self.ensure_len(series)?;

        let closes = series.closes();
        let price = series.last().map(|b| b.close).and_then(finite);

        let basis = last_sma(&closes, BB_PERIOD);
        let dev = rolling_std(&closes, BB_PERIOD).last().copied().and_then(finite);
        let (bb_upper, bb_lower) = match (basis, dev) {
            (Some(b), Some(d)) => (Some(b + BB_MULT * d), Some(b - BB_MULT * d)),
            _ => (None, None),
        };

        let rsi_value = rsi(&closes, RSI_PERIOD);
        let sma_200 = last_sma(&closes, 200);

        let round2 = |v: Option<f64>| v.map(|x| round_to(x, 2));
        let indicators = SnapshotIndicators {
            rsi: round2(rsi_value),
            bb_upper: round2(bb_upper),
            bb_lower: round2(bb_lower),
            sma_5: round2(last_sma(&closes, 5)),
            sma_50: round2(last_sma(&closes, 50)),
            sma_200: round2(sma_200),
        };

        let symbol = series.symbol().to_string();
        let sma_desc = match (price, sma_200) {
            (Some(p), Some(s)) if p > s => "above",
            (Some(_), Some(_)) => "below",
            _ => "unknown",
        };
        let price_text = round2(price).map_or_else(|| "unknown".to_string(), |p| format!("${}", p));
        let rsi_text = indicators
            .rsi
            .map_or_else(|| "unavailable".to_string(), |r| r.to_string());

        let summary = format!(
            "The current price of {} is {}. RSI is at {}, which indicates the stock is {}. \
             The stock is trading {} its 200-day moving average.",
            symbol,
            price_text,
            rsi_text,
            rsi_description(rsi_value),
            sma_desc
        );

        Ok(Snapshot {
            symbol,
            price: round2(price),
            indicators,
            summary,
        })
    }
}
