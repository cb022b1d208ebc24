//! Directional movement (+DI / -DI) with Wilder smoothing.

use super::series::{sma_smooth, true_range, wilder_smooth};
use crate::types::PriceSeries;

/// Per-bar directional quantities, same length as the input series.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalSeries {
    pub true_range: Vec<f64>,
    pub dm_plus: Vec<f64>,
    pub dm_minus: Vec<f64>,
    pub di_plus: Vec<f64>,
    pub di_minus: Vec<f64>,
}

/// Raw +DM/-DM. Only the larger positive excursion survives; ties give 0 for both.
pub fn directional_moves(highs: &[f64], lows: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut plus = vec![0.0; highs.len()];
    let mut minus = vec![0.0; highs.len()];

    for i in 1..highs.len() {
        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];

        if up_move > down_move && up_move > 0.0 {
            plus[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus[i] = down_move;
        }
    }

    (plus, minus)
}

fn directional_index(smoothed_dm: &[f64], smoothed_tr: &[f64]) -> Vec<f64> {
    smoothed_dm
        .iter()
        .zip(smoothed_tr)
        .map(|(dm, tr)| {
            let di = dm / tr * 100.0;
            if *tr == 0.0 || !di.is_finite() {
                0.0
            } else {
                di
            }
        })
        .collect()
}

/// Compute +DI/-DI from a price series.
///
/// `smoothing_factor` pre-smooths high/low/close with an SMA (1 = off).
pub fn calculate_directional(
    series: &PriceSeries,
    adx_length: usize,
    smoothing_factor: usize,
) -> DirectionalSeries {
    let highs = sma_smooth(&series.highs(), smoothing_factor);
    let lows = sma_smooth(&series.lows(), smoothing_factor);
    let closes = sma_smooth(&series.closes(), smoothing_factor);

    let tr = true_range(&highs, &lows, &closes);
    let (dm_plus, dm_minus) = directional_moves(&highs, &lows);

    let smoothed_tr = wilder_smooth(&tr, adx_length);
    let smoothed_plus = wilder_smooth(&dm_plus, adx_length);
    let smoothed_minus = wilder_smooth(&dm_minus, adx_length);

    DirectionalSeries {
        di_plus: directional_index(&smoothed_plus, &smoothed_tr),
        di_minus: directional_index(&smoothed_minus, &smoothed_tr),
        true_range: tr,
        dm_plus,
        dm_minus,
    }
}
