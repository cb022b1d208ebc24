//! Squeeze Momentum: Bollinger Bands inside Keltner Channels plus a
//! linear-regression momentum histogram.

use super::series::{linreg_last, rolling_max, rolling_mean, rolling_min, rolling_std, true_range};
use super::Indicator;
use crate::config::SqueezeParams;
use crate::error::IndicatorError;
use crate::types::{
    finite, round_to, MomentumColor, PriceSeries, SqueezeColor, SqueezeDirection, SqueezePoint,
    SqueezeReport, SqueezeState, SqueezeSummary, TrendLabel,
};

/// Squeeze flags for one bar. NaN bands compare false, giving `NoSqueeze`.
pub fn squeeze_state(upper_bb: f64, lower_bb: f64, upper_kc: f64, lower_kc: f64) -> SqueezeState {
    if lower_bb > lower_kc && upper_bb < upper_kc {
        SqueezeState::SqueezeOn
    } else if lower_bb < lower_kc && upper_bb > upper_kc {
        SqueezeState::SqueezeOff
    } else {
        SqueezeState::Neutral
    }
}

pub fn momentum_color(value: f64, prev: f64) -> MomentumColor {
    match (value > 0.0, value > prev, value < prev) {
        (true, true, _) => MomentumColor::Lime,
        (true, false, _) => MomentumColor::Green,
        (false, _, true) => MomentumColor::Red,
        (false, _, false) => MomentumColor::Maroon,
    }
}

/// Linear-regression momentum of `close - avg(avg(highest, lowest), sma)`.
///
/// Bars without a full window of defined deviations are 0.
pub fn momentum(highs: &[f64], lows: &[f64], closes: &[f64], length: usize) -> Vec<f64> {
    let length = length.max(1);
    let highest = rolling_max(highs, length);
    let lowest = rolling_min(lows, length);
    let sma = rolling_mean(closes, length);

    let deviation: Vec<f64> = (0..closes.len())
        .map(|i| {
            let avg_val = ((highest[i] + lowest[i]) / 2.0 + sma[i]) / 2.0;
            closes[i] - avg_val
        })
        .collect();

    (0..closes.len())
        .map(|i| {
            if i + 1 < length {
                return 0.0;
            }
            let window = &deviation[i + 1 - length..=i];
            if window.iter().all(|v| v.is_finite()) {
                linreg_last(window)
            } else {
                0.0
            }
        })
        .collect()
}

/// Squeeze Momentum indicator.
#[derive(Debug, Clone, Default)]
pub struct SqueezeMomentum {
    params: SqueezeParams,
}

impl SqueezeMomentum {
    pub fn new(params: SqueezeParams) -> Self {
        Self { params }
    }

    pub fn points(&self, series: &PriceSeries) -> Vec<SqueezePoint> {
        let p = &self.params;
        let highs = series.highs();
        let lows = series.lows();
        let closes = series.closes();

        let basis = rolling_mean(&closes, p.bb_length);
        let deviation = rolling_std(&closes, p.bb_length);

        let ma = rolling_mean(&closes, p.kc_length);
        let range: Vec<f64> = if p.use_true_range {
            true_range(&highs, &lows, &closes)
        } else {
            highs.iter().zip(&lows).map(|(h, l)| h - l).collect()
        };
        let range_ma = rolling_mean(&range, p.kc_length);

        let values = momentum(&highs, &lows, &closes, p.kc_length);

        series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let band = p.bb_mult * deviation[i];
                let upper_bb = basis[i] + band;
                let lower_bb = basis[i] - band;
                let upper_kc = ma[i] + range_ma[i] * p.kc_mult;
                let lower_kc = ma[i] - range_ma[i] * p.kc_mult;

                let state = squeeze_state(upper_bb, lower_bb, upper_kc, lower_kc);
                let prev = if i > 0 { values[i - 1] } else { 0.0 };

                SqueezePoint {
                    date: bar.date,
                    upper_bb: finite(upper_bb),
                    lower_bb: finite(lower_bb),
                    upper_kc: finite(upper_kc),
                    lower_kc: finite(lower_kc),
                    squeeze_on: state == SqueezeState::SqueezeOn,
                    squeeze_off: state == SqueezeState::SqueezeOff,
                    no_squeeze: state == SqueezeState::Neutral,
                    momentum: values[i],
                    color: momentum_color(values[i], prev),
                    squeeze_color: if state == SqueezeState::SqueezeOn {
                        SqueezeColor::Black
                    } else {
                        SqueezeColor::Gray
                    },
                }
            })
            .collect()
    }
}

/// Latest-bar summary. `None` for an empty slice.
pub fn summarize(points: &[SqueezePoint]) -> Option<SqueezeSummary> {
    let latest = points.last()?;
    let prev = points.len().checked_sub(2).map_or(latest, |i| &points[i]);

    let (trend, direction) = if latest.momentum > 0.0 {
        let direction = if latest.momentum > prev.momentum {
            SqueezeDirection::BullishStrengthening
        } else {
            SqueezeDirection::BullishWeakening
        };
        (TrendLabel::Bullish, direction)
    } else {
        let direction = if latest.momentum < prev.momentum {
            SqueezeDirection::BearishStrengthening
        } else {
            SqueezeDirection::BearishWeakening
        };
        (TrendLabel::Bearish, direction)
    };

    let squeeze_state = if latest.squeeze_on {
        SqueezeState::SqueezeOn
    } else if latest.squeeze_off {
        SqueezeState::SqueezeOff
    } else {
        SqueezeState::Neutral
    };

    Some(SqueezeSummary {
        trend,
        direction,
        momentum: round_to(latest.momentum, 4),
        prev_momentum: round_to(prev.momentum, 4),
        squeeze_on: latest.squeeze_on,
        squeeze_off: latest.squeeze_off,
        squeeze_state,
        squeeze_text: squeeze_state.text(),
        color: latest.color,
        squeeze_color: latest.squeeze_color,
    })
}

impl Indicator for SqueezeMomentum {
    type Output = SqueezeReport;

    fn id(&self) -> &'static str {
        "squeeze_momentum"
    }

    fn min_periods(&self) -> usize {
        self.params.bb_length.max(self.params.kc_length)
    }

    fn calculate(&self, series: &PriceSeries) -> Result<SqueezeReport, IndicatorError> {
        self.ensure_len(series)?;

        let data = self.points(series);
        let summary = summarize(&data)
            .ok_or_else(|| IndicatorError::insufficient(self.id(), self.min_periods(), 0))?;

        Ok(SqueezeReport {
            symbol: series.symbol().to_string(),
            data,
            summary,
        })
    }
}
