//! Rolling-window statistics and smoothers shared by every indicator.
//!
//! Undefined values are carried as `f64::NAN`; callers sanitize at the
//! output boundary.

/// Statistic computed by [`rolling`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingStat {
    /// Arithmetic mean over a full window.
    Mean,
    /// Population standard deviation (ddof = 0) over a full window.
    Std,
    /// Minimum over the available window (min_periods = 1).
    Min,
    /// Maximum over the available window (min_periods = 1).
    Max,
}

/// Windowed statistic over `values`, one output per input.
pub fn rolling(values: &[f64], length: usize, stat: RollingStat) -> Vec<f64> {
    match stat {
        RollingStat::Mean => rolling_mean(values, length),
        RollingStat::Std => rolling_std(values, length),
        RollingStat::Min => rolling_min(values, length),
        RollingStat::Max => rolling_max(values, length),
    }
}

/// Apply `f` to each full trailing window; NaN until the window fills
/// or when the window holds a non-finite value.
fn full_window(values: &[f64], length: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let length = length.max(1);
    (0..values.len())
        .map(|i| {
            if i + 1 < length {
                return f64::NAN;
            }
            let window = &values[i + 1 - length..=i];
            if window.iter().all(|v| v.is_finite()) {
                f(window)
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Apply `f` to each trailing window of up to `length` values.
fn partial_window(values: &[f64], length: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let length = length.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(length);
            f(&values[start..=i])
        })
        .collect()
}

fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

pub fn rolling_mean(values: &[f64], length: usize) -> Vec<f64> {
    full_window(values, length, mean)
}

pub fn rolling_std(values: &[f64], length: usize) -> Vec<f64> {
    full_window(values, length, |window| {
        let m = mean(window);
        let variance = window.iter().map(|v| (v - m).powi(2)).sum::<f64>() / window.len() as f64;
        variance.sqrt()
    })
}

/// NaN entries are skipped; all-NaN windows stay NaN.
pub fn rolling_min(values: &[f64], length: usize) -> Vec<f64> {
    partial_window(values, length, |w| w.iter().copied().fold(f64::NAN, f64::min))
}

/// NaN entries are skipped; all-NaN windows stay NaN.
pub fn rolling_max(values: &[f64], length: usize) -> Vec<f64> {
    partial_window(values, length, |w| w.iter().copied().fold(f64::NAN, f64::max))
}

/// Optional SMA pre-smoothing with min_periods = 1. `length <= 1` is a no-op.
pub fn sma_smooth(values: &[f64], length: usize) -> Vec<f64> {
    if length <= 1 {
        return values.to_vec();
    }
    partial_window(values, length, mean)
}

/// Wilder's recursive accumulator.
///
/// `acc[0] = x[0]`, `acc[i] = acc[i-1] - acc[i-1] / length + x[i]`. This is
/// unnormalized: it converges to `length * mean`, not the mean. NaN inputs
/// count as 0.
pub fn wilder_smooth(values: &[f64], length: usize) -> Vec<f64> {
    let length = length.max(1) as f64;
    let mut result = Vec::with_capacity(values.len());
    let mut acc: Option<f64> = None;

    for &value in values {
        let value = if value.is_nan() { 0.0 } else { value };
        let next = match acc {
            None => value,
            Some(prev) => prev - prev / length + value,
        };
        result.push(next);
        acc = Some(next);
    }

    result
}

/// Rolling min-max normalization (min_periods = 1).
///
/// A zero span is replaced by 1, so constant windows map to `x - min`.
pub fn norm_in_window(values: &[f64], window: usize) -> Vec<f64> {
    let mins = rolling_min(values, window);
    let maxs = rolling_max(values, window);

    values
        .iter()
        .zip(mins.iter().zip(maxs.iter()))
        .map(|(x, (lo, hi))| {
            let span = hi - lo;
            let span = if span == 0.0 { 1.0 } else { span };
            (x - lo) / span
        })
        .collect()
}

/// Clamp to [0, 1] then raise to `gamma`.
pub fn gamma_adjust(value: f64, gamma: f64) -> f64 {
    value.clamp(0.0, 1.0).powf(gamma)
}

/// True Range per bar. The first bar has no previous close, so it reduces
/// to `high - low`.
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    (0..highs.len())
        .map(|i| {
            let prev_close = if i > 0 { closes[i - 1] } else { f64::NAN };
            let hl = highs[i] - lows[i];
            let hc = (highs[i] - prev_close).abs();
            let lc = (lows[i] - prev_close).abs();
            hl.max(hc).max(lc)
        })
        .collect()
}

/// Exponential moving average seeded with the SMA of the first `length`
/// values. NaN before the seed.
pub fn ema(values: &[f64], length: usize) -> Vec<f64> {
    let length = length.max(1);
    let mut result = vec![f64::NAN; values.len()];
    if values.len() < length {
        return result;
    }

    let multiplier = 2.0 / (length as f64 + 1.0);
    let mut current = mean(&values[..length]);
    result[length - 1] = current;

    for (i, value) in values.iter().enumerate().skip(length) {
        current = (value - current) * multiplier + current;
        result[i] = current;
    }

    result
}

/// Least-squares line through `(0..n, y)`, evaluated at the last x.
pub fn linreg_last(y: &[f64]) -> f64 {
    let n = y.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return y[0];
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(y);
    let (num, den) = y.iter().enumerate().fold((0.0, 0.0), |(num, den), (i, yi)| {
        let dx = i as f64 - x_mean;
        (num + dx * (yi - y_mean), den + dx * dx)
    });

    let slope = num / den;
    let intercept = y_mean - slope * x_mean;
    intercept + slope * (n - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_wilder_smooth_recurrence() {
        let smoothed = wilder_smooth(&[10.0, 12.0, 8.0], 3);
        assert_eq!(smoothed[0], 10.0);
        assert!((smoothed[1] - 18.666_666_667).abs() < 1e-6);
        assert!((smoothed[2] - 20.444_444_444).abs() < 1e-6);
    }

    #[test]
    fn test_wilder_smooth_nan_counts_as_zero() {
        let smoothed = wilder_smooth(&[f64::NAN, 3.0], 3);
        assert_eq!(smoothed, vec![0.0, 3.0]);
    }

    #[test]
    fn test_rolling_mean_requires_full_window() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(out[0].is_nan() && out[1].is_nan());
        assert!(approx(out[2], 2.0));
        assert!(approx(out[3], 3.0));
    }

    #[test]
    fn test_rolling_std_is_population() {
        let out = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        assert!(approx(out[7], 2.0));
    }

    #[test]
    fn test_rolling_min_max_min_periods_one() {
        let values = [3.0, 1.0, 4.0, 1.5, 5.0];
        assert_eq!(rolling_min(&values, 2), vec![3.0, 1.0, 1.0, 1.5, 1.5]);
        assert_eq!(rolling_max(&values, 2), vec![3.0, 3.0, 4.0, 4.0, 5.0]);
        assert_eq!(rolling(&values, 10, RollingStat::Max)[0], 3.0);
    }

    #[test]
    fn test_norm_constant_series_is_zero() {
        assert_eq!(norm_in_window(&[5.0, 5.0, 5.0, 5.0], 4), vec![0.0; 4]);
    }

    #[test]
    fn test_norm_in_window_range() {
        let out = norm_in_window(&[0.0, 5.0, 10.0], 3);
        assert_eq!(out, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_gamma_adjust_clamps() {
        assert_eq!(gamma_adjust(1.5, 0.7), 1.0);
        assert_eq!(gamma_adjust(-0.2, 0.7), 0.0);
        assert!(approx(gamma_adjust(0.25, 0.5), 0.5));
    }

    #[test]
    fn test_sma_smooth_noop_for_length_one() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(sma_smooth(&values, 1), values.to_vec());
        assert_eq!(sma_smooth(&values, 2), vec![1.0, 1.5, 2.5]);
    }

    #[test]
    fn test_true_range_first_bar() {
        let tr = true_range(&[10.0, 12.0], &[8.0, 11.0], &[9.0, 11.5]);
        assert_eq!(tr[0], 2.0);
        // gap up: |12 - 9| dominates
        assert_eq!(tr[1], 3.0);
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let out = ema(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(out[1].is_nan());
        assert!(approx(out[2], 2.0));
        assert!(approx(out[3], 3.0));
    }

    #[test]
    fn test_linreg_last_on_line() {
        assert!(approx(linreg_last(&[1.0, 3.0, 5.0, 7.0]), 7.0));
        assert!(approx(linreg_last(&[2.0]), 2.0));
    }

    #[test]
    fn test_linreg_last_projects_fit() {
        // fit of (0,0),(1,2),(2,1): slope 0.5, intercept 0.5
        assert!(approx(linreg_last(&[0.0, 2.0, 1.0]), 1.5));
    }
}
