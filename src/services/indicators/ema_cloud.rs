//! EMA cloud trend classification over three fast/slow pairs.

use super::series::ema;
use super::Indicator;
use crate::error::IndicatorError;
use crate::types::{
    finite, round_to, CloudState, EmaCloud, EmaCloudReport, EmaCloudSummary, OverallTrend,
    PriceSeries,
};

/// `(fast, slow, name)` for each cloud, shortest first.
pub const EMA_CLOUDS: [(usize, usize, &str); 3] = [
    (5, 12, "short_term"),
    (34, 50, "medium_term"),
    (72, 89, "long_term"),
];

/// Aggregate cloud states into an overall label.
///
/// With three clouds one side always has at least two, so `Mixed` only
/// becomes reachable if the cloud count changes.
pub fn overall_trend(bullish: usize, total: usize) -> OverallTrend {
    let bearish = total - bullish;
    if bullish == total {
        OverallTrend::StrongBullish
    } else if bullish >= 2 {
        OverallTrend::Bullish
    } else if bearish == total {
        OverallTrend::StrongBearish
    } else if bearish >= 2 {
        OverallTrend::Bearish
    } else {
        OverallTrend::Mixed
    }
}

/// EMA cloud classifier.
#[derive(Debug, Clone, Default)]
pub struct EmaClouds;

impl Indicator for EmaClouds {
    type Output = EmaCloudReport;

    fn id(&self) -> &'static str {
        "ema_clouds"
    }

    fn min_periods(&self) -> usize {
        EMA_CLOUDS.iter().map(|(_, slow, _)| *slow).max().unwrap_or(0)
    }

    fn calculate(&self, series: &PriceSeries) -> Result<EmaCloudReport, IndicatorError> {
        self.ensure_len(series)?;

        let closes = series.closes();
        let clouds: Vec<EmaCloud> = EMA_CLOUDS
            .iter()
            .map(|&(fast_period, slow_period, name)| {
                let fast = ema(&closes, fast_period).last().copied().unwrap_or(f64::NAN);
                let slow = ema(&closes, slow_period).last().copied().unwrap_or(f64::NAN);

                EmaCloud {
                    name,
                    fast_period,
                    slow_period,
                    ema_fast: finite(fast).map(|v| round_to(v, 2)),
                    ema_slow: finite(slow).map(|v| round_to(v, 2)),
                    state: if fast > slow {
                        CloudState::Bullish
                    } else {
                        CloudState::Bearish
                    },
                }
            })
            .collect();

        let total = clouds.len();
        let bullish = clouds
            .iter()
            .filter(|c| c.state == CloudState::Bullish)
            .count();

        Ok(EmaCloudReport {
            symbol: series.symbol().to_string(),
            summary: EmaCloudSummary {
                bullish_clouds: bullish,
                bearish_clouds: total - bullish,
                total_clouds: total,
                overall_trend: overall_trend(bullish, total),
            },
            clouds,
        })
    }
}
