use std::env;

pub const ADX_LENGTH: usize = 9;
pub const SMOOTHING_FACTOR: usize = 1;
pub const COLLECT_LENGTH: usize = 100;
pub const GAMMA_BARS: f64 = 0.7;
pub const GAMMA_PLOTS: f64 = 0.8;

pub const BB_LENGTH: usize = 20;
pub const BB_MULT: f64 = 2.0;
pub const KC_LENGTH: usize = 20;
pub const KC_MULT: f64 = 1.5;
pub const USE_TRUE_RANGE: bool = true;

pub const HV_WINDOW: usize = 30;
/// Trading days in the trailing 52-week HV rank window.
pub const HV_RANK_WINDOW: usize = 252;

pub const RISK_FREE_RATE: f64 = 0.045;
pub const TARGET_DELTA: f64 = -0.30;
pub const TARGET_DTE: i64 = 30;
pub const MIN_DTE: i64 = 7;
pub const MAX_DTE: i64 = 60;
pub const FALLBACK_IV: f64 = 0.5;

/// Mystic Pulse parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MysticPulseParams {
    /// Wilder smoothing length for TR and DM.
    pub adx_length: usize,
    /// SMA length applied to OHLC before DM (1 = none).
    pub smoothing_factor: usize,
    /// Rolling window for intensity normalization.
    pub collect_length: usize,
    pub gamma_bars: f64,
    pub gamma_plots: f64,
}

impl Default for MysticPulseParams {
    fn default() -> Self {
        Self {
            adx_length: ADX_LENGTH,
            smoothing_factor: SMOOTHING_FACTOR,
            collect_length: COLLECT_LENGTH,
            gamma_bars: GAMMA_BARS,
            gamma_plots: GAMMA_PLOTS,
        }
    }
}

/// Squeeze momentum parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqueezeParams {
    pub bb_length: usize,
    pub bb_mult: f64,
    pub kc_length: usize,
    pub kc_mult: f64,
    /// Use True Range for the Keltner range average, else high - low.
    pub use_true_range: bool,
}

impl Default for SqueezeParams {
    fn default() -> Self {
        Self {
            bb_length: BB_LENGTH,
            bb_mult: BB_MULT,
            kc_length: KC_LENGTH,
            kc_mult: KC_MULT,
            use_true_range: USE_TRUE_RANGE,
        }
    }
}

/// Historical volatility and option delta search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityParams {
    pub hv_window: usize,
    pub rank_window: usize,
    /// Annual risk-free rate as a decimal.
    pub risk_free_rate: f64,
    pub target_delta: f64,
    pub target_dte: i64,
    pub min_dte: i64,
    pub max_dte: i64,
    /// Volatility used when a quote's implied volatility is not positive.
    pub fallback_iv: f64,
}

impl Default for VolatilityParams {
    fn default() -> Self {
        Self {
            hv_window: HV_WINDOW,
            rank_window: HV_RANK_WINDOW,
            risk_free_rate: RISK_FREE_RATE,
            target_delta: TARGET_DELTA,
            target_dte: TARGET_DTE,
            min_dte: MIN_DTE,
            max_dte: MAX_DTE,
            fallback_iv: FALLBACK_IV,
        }
    }
}

/// Indicator defaults used when a request does not override them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorConfig {
    pub mystic_pulse: MysticPulseParams,
    pub squeeze: SqueezeParams,
    pub volatility: VolatilityParams,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    pub indicators: IndicatorConfig,
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mystic_pulse = MysticPulseParams {
            adx_length: parse_env("ADX_LENGTH", ADX_LENGTH),
            collect_length: parse_env("COLLECT_LENGTH", COLLECT_LENGTH),
            ..MysticPulseParams::default()
        };

        let volatility = VolatilityParams {
            risk_free_rate: parse_env("RISK_FREE_RATE", RISK_FREE_RATE),
            target_delta: parse_env("TARGET_DELTA", TARGET_DELTA),
            target_dte: parse_env("TARGET_DTE", TARGET_DTE),
            min_dte: parse_env("MIN_DTE", MIN_DTE),
            max_dte: parse_env("MAX_DTE", MAX_DTE),
            ..VolatilityParams::default()
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 8000),
            indicators: IndicatorConfig {
                mystic_pulse,
                squeeze: SqueezeParams::default(),
                volatility,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mystic_pulse_defaults() {
        let params = MysticPulseParams::default();
        assert_eq!(params.adx_length, 9);
        assert_eq!(params.smoothing_factor, 1);
        assert_eq!(params.collect_length, 100);
        assert_eq!(params.gamma_bars, 0.7);
        assert_eq!(params.gamma_plots, 0.8);
    }

    #[test]
    fn test_squeeze_defaults() {
        let params = SqueezeParams::default();
        assert_eq!(params.bb_length, 20);
        assert_eq!(params.kc_length, 20);
        assert_eq!(params.bb_mult, 2.0);
        assert_eq!(params.kc_mult, 1.5);
        assert!(params.use_true_range);
    }

    #[test]
    fn test_volatility_defaults() {
        let params = VolatilityParams::default();
        assert_eq!(params.risk_free_rate, 0.045);
        assert_eq!(params.target_delta, -0.30);
        assert_eq!((params.min_dte, params.target_dte, params.max_dte), (7, 30, 60));
        assert_eq!(params.hv_window, 30);
        assert_eq!(params.rank_window, 252);
    }

    #[test]
    fn test_parse_env_falls_back_on_missing_key() {
        assert_eq!(parse_env("STOCKPULSE_TEST_UNSET_KEY", 42u16), 42);
    }

    #[test]
    fn test_config_clone() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 9000,
            indicators: IndicatorConfig::default(),
        };
        let cloned = config.clone();
        assert_eq!(cloned.host, config.host);
        assert_eq!(cloned.port, 9000);
        assert_eq!(cloned.indicators, IndicatorConfig::default());
    }
}
