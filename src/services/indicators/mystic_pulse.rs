//! Mystic Pulse: directional streak counting with gradient intensity.
//!
//! Counts consecutive bars on which the dominant DI line keeps rising, then
//! normalizes the streak lengths inside a rolling window for display.

use std::cmp::Ordering;

use super::directional::calculate_directional;
use super::series::{gamma_adjust, norm_in_window};
use super::Indicator;
use crate::config::MysticPulseParams;
use crate::error::IndicatorError;
use crate::types::{
    round_to, MomentumLabel, MysticPulsePoint, MysticPulseReport, MysticPulseSummary,
    PriceSeries, Rgb, TrendLabel,
};

/// Which streak rule fired on a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// +DI rose and dominates -DI.
    Bullish,
    /// -DI rose and dominates +DI.
    Bearish,
    /// Counters carry forward.
    Hold,
}

impl Transition {
    /// Classify bar `cur` against `prev`, both as `(di_plus, di_minus)`.
    pub fn classify(prev: (f64, f64), cur: (f64, f64)) -> Self {
        let (prev_plus, prev_minus) = prev;
        let (plus, minus) = cur;

        if plus > prev_plus && plus > minus {
            Transition::Bullish
        } else if minus > prev_minus && minus > plus {
            Transition::Bearish
        } else {
            Transition::Hold
        }
    }
}

/// Streak counters carried from bar to bar. At most one is growing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakState {
    pub positive_count: u32,
    pub negative_count: u32,
}

impl StreakState {
    pub fn trend_score(&self) -> i64 {
        i64::from(self.positive_count) - i64::from(self.negative_count)
    }

    pub fn apply(self, transition: Transition) -> Self {
        match transition {
            Transition::Bullish => StreakState {
                positive_count: self.positive_count + 1,
                negative_count: 0,
            },
            Transition::Bearish => StreakState {
                positive_count: 0,
                negative_count: self.negative_count + 1,
            },
            Transition::Hold => self,
        }
    }
}

/// Left-to-right fold of the streak state machine. Bar 0 starts at zero.
pub fn streaks(di_plus: &[f64], di_minus: &[f64]) -> Vec<StreakState> {
    let Some((&first_plus, &first_minus)) = di_plus.first().zip(di_minus.first()) else {
        return Vec::new();
    };

    let mut states = Vec::with_capacity(di_plus.len());
    states.push(StreakState::default());

    di_plus
        .iter()
        .zip(di_minus)
        .skip(1)
        .scan(
            ((first_plus, first_minus), StreakState::default()),
            |(prev, state), (&plus, &minus)| {
                *state = state.apply(Transition::classify(*prev, (plus, minus)));
                *prev = (plus, minus);
                Some(*state)
            },
        )
        .for_each(|state| states.push(state));

    states
}

fn lerp(from: u8, to: u8, t: f64) -> u8 {
    (f64::from(from) + (f64::from(to) - f64::from(from)) * t) as u8
}

/// Bullish scores fade dark to neon green, bearish dark to neon red.
pub fn pulse_color(trend_score: i64, intensity: f64) -> Rgb {
    match trend_score.cmp(&0) {
        Ordering::Greater => Rgb::new(
            lerp(0, 0, intensity),
            lerp(90, 255, intensity),
            lerp(0, 102, intensity),
        ),
        Ordering::Less => Rgb::new(
            lerp(122, 255, intensity),
            lerp(0, 26, intensity),
            lerp(0, 26, intensity),
        ),
        Ordering::Equal => Rgb::NEUTRAL,
    }
}

/// Latest-bar summary. `None` for an empty slice.
pub fn summarize(points: &[MysticPulsePoint]) -> Option<MysticPulseSummary> {
    let latest = points.last()?;
    let prev = points.len().checked_sub(2).map_or(latest, |i| &points[i]);

    let trend = match latest.trend_score.cmp(&0) {
        Ordering::Greater => TrendLabel::Bullish,
        Ordering::Less => TrendLabel::Bearish,
        Ordering::Equal => TrendLabel::Neutral,
    };
    let strength = if trend == TrendLabel::Neutral {
        0.0
    } else {
        latest.magnitude_intensity
    };

    let momentum = match latest.trend_score.abs().cmp(&prev.trend_score.abs()) {
        Ordering::Greater => MomentumLabel::Strengthening,
        Ordering::Less => MomentumLabel::Weakening,
        Ordering::Equal => MomentumLabel::Steady,
    };

    Some(MysticPulseSummary {
        trend,
        strength: round_to(strength, 3),
        momentum,
        trend_score: latest.trend_score,
        di_plus: round_to(latest.di_plus, 2),
        di_minus: round_to(latest.di_minus, 2),
        positive_count: latest.positive_count,
        negative_count: latest.negative_count,
        positive_intensity: round_to(latest.positive_intensity, 3),
        negative_intensity: round_to(latest.negative_intensity, 3),
        pulse_color: latest.pulse_color,
    })
}

/// Mystic Pulse indicator.
#[derive(Debug, Clone, Default)]
pub struct MysticPulse {
    params: MysticPulseParams,
}

impl MysticPulse {
    pub fn new(params: MysticPulseParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MysticPulseParams {
        &self.params
    }

    /// Per-bar points without the summary.
    pub fn points(&self, series: &PriceSeries) -> Vec<MysticPulsePoint> {
        let p = &self.params;
        let dir = calculate_directional(series, p.adx_length, p.smoothing_factor);
        let states = streaks(&dir.di_plus, &dir.di_minus);

        let magnitudes: Vec<f64> = states.iter().map(|s| s.trend_score().abs() as f64).collect();
        let positives: Vec<f64> = states.iter().map(|s| f64::from(s.positive_count)).collect();
        let negatives: Vec<f64> = states.iter().map(|s| f64::from(s.negative_count)).collect();

        let mag_norm = norm_in_window(&magnitudes, p.collect_length);
        let pos_norm = norm_in_window(&positives, p.collect_length);
        let neg_norm = norm_in_window(&negatives, p.collect_length);

        series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let state = states[i];
                let score = state.trend_score();
                let magnitude_intensity = gamma_adjust(mag_norm[i], p.gamma_bars);

                MysticPulsePoint {
                    date: bar.date,
                    di_plus: dir.di_plus[i],
                    di_minus: dir.di_minus[i],
                    positive_count: state.positive_count,
                    negative_count: state.negative_count,
                    trend_score: score,
                    magnitude_intensity,
                    positive_intensity: gamma_adjust(pos_norm[i], p.gamma_plots),
                    negative_intensity: gamma_adjust(neg_norm[i], p.gamma_plots),
                    dominant_direction: score.signum() as i8,
                    pulse_color: pulse_color(score, magnitude_intensity),
                }
            })
            .collect()
    }
}

impl Indicator for MysticPulse {
    type Output = MysticPulseReport;

    fn id(&self) -> &'static str {
        "mystic_pulse"
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn calculate(&self, series: &PriceSeries) -> Result<MysticPulseReport, IndicatorError> {
        self.ensure_len(series)?;

        let data = self.points(series);
        let summary = summarize(&data)
            .ok_or_else(|| IndicatorError::insufficient(self.id(), 1, 0))?;

        Ok(MysticPulseReport {
            symbol: series.symbol().to_string(),
            adx_length: self.params.adx_length,
            smoothing_factor: self.params.smoothing_factor,
            data,
            summary,
        })
    }
}
