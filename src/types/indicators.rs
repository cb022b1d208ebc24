use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Map NaN and infinities to "no value".
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Round to `digits` decimal places.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Display color serialized as `rgb(r,g,b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const NEUTRAL: Rgb = Rgb::new(128, 128, 128);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Direction of the latest trend score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Bullish,
    Bearish,
    Neutral,
}

/// Change in absolute trend score versus the previous bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumLabel {
    Strengthening,
    Weakening,
    Steady,
}

// ========== Mystic Pulse ==========

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MysticPulsePoint {
    pub date: NaiveDate,
    pub di_plus: f64,
    pub di_minus: f64,
    pub positive_count: u32,
    pub negative_count: u32,
    pub trend_score: i64,
    pub magnitude_intensity: f64,
    pub positive_intensity: f64,
    pub negative_intensity: f64,
    /// Sign of `trend_score`: -1, 0 or 1.
    pub dominant_direction: i8,
    pub pulse_color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MysticPulseSummary {
    pub trend: TrendLabel,
    pub strength: f64,
    pub momentum: MomentumLabel,
    pub trend_score: i64,
    pub di_plus: f64,
    pub di_minus: f64,
    pub positive_count: u32,
    pub negative_count: u32,
    pub positive_intensity: f64,
    pub negative_intensity: f64,
    pub pulse_color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MysticPulseReport {
    pub symbol: String,
    pub adx_length: usize,
    pub smoothing_factor: usize,
    pub data: Vec<MysticPulsePoint>,
    pub summary: MysticPulseSummary,
}

// ========== Squeeze Momentum ==========

/// Histogram color of the momentum bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentumColor {
    /// Positive and rising.
    Lime,
    /// Positive, not rising.
    Green,
    /// Non-positive and falling.
    Red,
    Maroon,
}

impl MomentumColor {
    pub fn hex(&self) -> &'static str {
        match self {
            MomentumColor::Lime => "#00FF00",
            MomentumColor::Green => "#008000",
            MomentumColor::Red => "#FF0000",
            MomentumColor::Maroon => "#800000",
        }
    }
}

impl Serialize for MomentumColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hex())
    }
}

/// Squeeze dot color: black while squeezed, gray otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqueezeColor {
    Black,
    Gray,
}

impl SqueezeColor {
    pub fn hex(&self) -> &'static str {
        match self {
            SqueezeColor::Black => "#000000",
            SqueezeColor::Gray => "#808080",
        }
    }
}

impl Serialize for SqueezeColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hex())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqueezePoint {
    pub date: NaiveDate,
    pub upper_bb: Option<f64>,
    pub lower_bb: Option<f64>,
    pub upper_kc: Option<f64>,
    pub lower_kc: Option<f64>,
    pub squeeze_on: bool,
    pub squeeze_off: bool,
    pub no_squeeze: bool,
    pub momentum: f64,
    pub color: MomentumColor,
    pub squeeze_color: SqueezeColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqueezeDirection {
    BullishStrengthening,
    BullishWeakening,
    BearishStrengthening,
    BearishWeakening,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqueezeState {
    SqueezeOn,
    SqueezeOff,
    Neutral,
}

impl SqueezeState {
    pub fn text(&self) -> &'static str {
        match self {
            SqueezeState::SqueezeOn => "Squeeze ON - Building pressure",
            SqueezeState::SqueezeOff => "Squeeze Released - Breakout potential",
            SqueezeState::Neutral => "No squeeze detected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqueezeSummary {
    pub trend: TrendLabel,
    pub direction: SqueezeDirection,
    pub momentum: f64,
    pub prev_momentum: f64,
    pub squeeze_on: bool,
    pub squeeze_off: bool,
    pub squeeze_state: SqueezeState,
    pub squeeze_text: &'static str,
    pub color: MomentumColor,
    pub squeeze_color: SqueezeColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqueezeReport {
    pub symbol: String,
    pub data: Vec<SqueezePoint>,
    pub summary: SqueezeSummary,
}

// ========== EMA Clouds ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudState {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallTrend {
    StrongBullish,
    Bullish,
    StrongBearish,
    Bearish,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmaCloud {
    pub name: &'static str,
    pub fast_period: usize,
    pub slow_period: usize,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub state: CloudState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmaCloudSummary {
    pub bullish_clouds: usize,
    pub bearish_clouds: usize,
    pub total_clouds: usize,
    pub overall_trend: OverallTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmaCloudReport {
    pub symbol: String,
    pub clouds: Vec<EmaCloud>,
    pub summary: EmaCloudSummary,
}

// ========== Volatility ==========

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityReport {
    pub symbol: String,
    /// Latest annualized historical volatility, percent.
    pub hv_current: Option<f64>,
    /// Percentile of `hv_current` within the trailing rank window (0-100).
    pub hv_rank: Option<f64>,
    pub hv_min: Option<f64>,
    pub hv_max: Option<f64>,
    /// Near-the-money put IV for the selected expiry, percent.
    pub iv_current: Option<f64>,
    pub iv_hv_ratio: Option<f64>,
}

// ========== Snapshot ==========

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotIndicators {
    pub rsi: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub sma_5: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub symbol: String,
    pub price: Option<f64>,
    pub indicators: SnapshotIndicators,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(f64::INFINITY), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(0.9996, 3), 1.0);
    }

    #[test]
    fn test_rgb_serialization() {
        let json = serde_json::to_string(&Rgb::new(0, 90, 0)).unwrap();
        assert_eq!(json, "\"rgb(0,90,0)\"");
        assert_eq!(Rgb::NEUTRAL.to_string(), "rgb(128,128,128)");
    }

    #[test]
    fn test_color_serialization() {
        assert_eq!(serde_json::to_string(&MomentumColor::Lime).unwrap(), "\"#00FF00\"");
        assert_eq!(serde_json::to_string(&SqueezeColor::Black).unwrap(), "\"#000000\"");
    }

    #[test]
    fn test_label_serialization() {
        assert_eq!(
            serde_json::to_string(&OverallTrend::StrongBullish).unwrap(),
            "\"strong_bullish\""
        );
        assert_eq!(
            serde_json::to_string(&SqueezeDirection::BearishWeakening).unwrap(),
            "\"bearish_weakening\""
        );
    }
}
