//! Indicator property tests over synthetic price series.

use chrono::{Duration, NaiveDate};
use stockpulse::config::{MysticPulseParams, SqueezeParams, VolatilityParams};
use stockpulse::services::indicators::directional::directional_moves;
use stockpulse::services::indicators::series::{norm_in_window, wilder_smooth};
use stockpulse::services::{
    EmaClouds, HistoricalVolatility, Indicator, MysticPulse, OptionsService, SqueezeMomentum,
};
use stockpulse::types::{CloudState, OverallTrend, PriceBar, PriceSeries};

/// Deterministic noisy walk so tests don't depend on an RNG crate.
fn noisy_series(symbol: &str, len: usize, drift: f64) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut close = 1000.0;

    let bars = (0..len)
        .map(|i| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let noise = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
            let open = close;
            close = (close + drift + noise * 3.0).max(1.0);
            PriceBar {
                date: start + Duration::days(i as i64),
                open,
                high: open.max(close) + noise.abs(),
                low: (open.min(close) - noise.abs()).max(0.5),
                close,
                volume: 10_000 + i as u64,
            }
        })
        .collect();

    PriceSeries::new(symbol, bars).unwrap()
}

fn flat_series(len: usize) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let bars = (0..len)
        .map(|i| PriceBar {
            date: start + Duration::days(i as i64),
            open: 50.0,
            high: 50.0,
            low: 50.0,
            close: 50.0,
            volume: 0,
        })
        .collect();
    PriceSeries::new("FLAT", bars).unwrap()
}

#[test]
fn test_wilder_recurrence_holds() {
    let series = noisy_series("WLDR", 80, 0.1);
    let closes = series.closes();
    let smoothed = wilder_smooth(&closes, 9);

    assert_eq!(smoothed[0], closes[0]);
    for t in 1..closes.len() {
        let expected = smoothed[t - 1] - smoothed[t - 1] / 9.0 + closes[t];
        assert!((smoothed[t] - expected).abs() < 1e-9);
    }
}

#[test]
fn test_directional_moves_are_exclusive() {
    let series = noisy_series("DMX", 200, 0.0);
    let (plus, minus) = directional_moves(&series.highs(), &series.lows());

    for (p, m) in plus.iter().zip(&minus) {
        assert!(*p >= 0.0 && *m >= 0.0);
        assert!(*p == 0.0 || *m == 0.0);
    }
}

#[test]
fn test_streak_counts_are_monotone_and_exclusive() {
    let series = noisy_series("STRK", 250, 0.05);
    let points = MysticPulse::default().points(&series);

    assert_eq!(points[0].positive_count, 0);
    assert_eq!(points[0].negative_count, 0);
    for pair in points.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        assert!(cur.positive_count == 0 || cur.negative_count == 0);
        // Counters reset, hold, or grow by exactly one.
        for (now, before) in [
            (cur.positive_count, prev.positive_count),
            (cur.negative_count, prev.negative_count),
        ] {
            assert!(now == 0 || now == before || now == before + 1);
        }
        if cur.positive_count > prev.positive_count {
            assert_eq!(cur.negative_count, 0);
        }
        assert_eq!(
            cur.trend_score,
            cur.positive_count as i64 - cur.negative_count as i64
        );
    }
}

#[test]
fn test_intensities_are_bounded() {
    let series = noisy_series("INT", 300, -0.02);
    let points = MysticPulse::default().points(&series);

    for p in &points {
        for v in [p.magnitude_intensity, p.positive_intensity, p.negative_intensity] {
            assert!((0.0..=1.0).contains(&v), "intensity {} out of range", v);
        }
        assert_eq!(p.dominant_direction, p.trend_score.signum() as i8);
    }
}

#[test]
fn test_constant_window_normalizes_to_zero() {
    assert!(norm_in_window(&[3.0; 20], 10).iter().all(|v| *v == 0.0));

    let points = MysticPulse::default().points(&flat_series(40));
    assert!(points.iter().all(|p| p.trend_score == 0));
    assert!(points.iter().all(|p| p.magnitude_intensity == 0.0));
}

#[test]
fn test_mystic_pulse_custom_params_echoed() {
    let params = MysticPulseParams {
        adx_length: 14,
        smoothing_factor: 3,
        ..MysticPulseParams::default()
    };
    let report = MysticPulse::new(params)
        .calculate(&noisy_series("PRM", 60, 0.1))
        .unwrap();
    assert_eq!(report.adx_length, 14);
    assert_eq!(report.smoothing_factor, 3);
    assert_eq!(report.data.len(), 60);
}

#[test]
fn test_squeeze_states_are_exclusive() {
    let series = noisy_series("SQZ", 200, 0.0);
    let report = SqueezeMomentum::new(SqueezeParams::default())
        .calculate(&series)
        .unwrap();

    for p in &report.data {
        let active = [p.squeeze_on, p.squeeze_off, p.no_squeeze]
            .iter()
            .filter(|s| **s)
            .count();
        assert_eq!(active, 1);
    }
    // Bands need a full window.
    assert!(report.data[18].upper_bb.is_none());
    assert!(report.data[19].upper_bb.is_some());
}

#[test]
fn test_squeeze_insufficient_data() {
    let result = SqueezeMomentum::default().calculate(&noisy_series("SHORT", 10, 0.0));
    assert!(result.is_err());
}

#[test]
fn test_ema_clouds_rising_market() {
    let series = noisy_series("UP", 200, 3.0);
    let report = EmaClouds.calculate(&series).unwrap();

    assert_eq!(report.clouds.len(), 3);
    assert!(report.clouds.iter().all(|c| c.state == CloudState::Bullish));
    assert_eq!(report.summary.overall_trend, OverallTrend::StrongBullish);
    assert_eq!(report.summary.total_clouds, 3);
}

#[test]
fn test_ema_clouds_falling_market() {
    let series = noisy_series("DOWN", 200, -3.0);
    let report = EmaClouds.calculate(&series).unwrap();
    assert_eq!(report.summary.overall_trend, OverallTrend::StrongBearish);
}

#[test]
fn test_volatility_report_ranges() {
    let series = noisy_series("HV", 300, 0.0);
    let report = HistoricalVolatility::new(VolatilityParams::default())
        .calculate(&series)
        .unwrap();

    let hv = report.hv_current.unwrap();
    let (lo, hi) = (report.hv_min.unwrap(), report.hv_max.unwrap());
    assert!(hv > 0.0);
    assert!(lo <= hv && hv <= hi);
    assert!((0.0..=100.0).contains(&report.hv_rank.unwrap()));
    assert!(report.iv_current.is_none());
}

#[test]
fn test_put_delta_reference_scenario() {
    let delta = OptionsService::new(0.045).put_delta(100.0, 90.0, 30.0 / 365.0, 0.5);
    assert!((delta + 0.203).abs() < 0.005);
}

#[test]
fn test_indicators_are_idempotent() {
    let series = noisy_series("IDEM", 150, 0.2);

    let first = serde_json::to_string(&MysticPulse::default().calculate(&series).unwrap()).unwrap();
    let second = serde_json::to_string(&MysticPulse::default().calculate(&series).unwrap()).unwrap();
    assert_eq!(first, second);

    let first = serde_json::to_string(&SqueezeMomentum::default().calculate(&series).unwrap()).unwrap();
    let second = serde_json::to_string(&SqueezeMomentum::default().calculate(&series).unwrap()).unwrap();
    assert_eq!(first, second);
}
