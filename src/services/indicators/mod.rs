//! Technical indicator implementations.
//!
//! Every indicator is a pure function of an immutable [`PriceSeries`]; none
//! depends on another's output.

pub mod directional;
pub mod ema_cloud;
pub mod mystic_pulse;
pub mod series;
pub mod snapshot;
pub mod squeeze;
pub mod volatility;

pub use ema_cloud::EmaClouds;
pub use mystic_pulse::MysticPulse;
pub use snapshot::SnapshotAnalyzer;
pub use squeeze::SqueezeMomentum;
pub use volatility::HistoricalVolatility;

use crate::error::IndicatorError;
use crate::types::PriceSeries;

/// Trait for implementing technical indicators.
pub trait Indicator: Send + Sync {
    type Output;

    /// Unique identifier for this indicator.
    fn id(&self) -> &'static str;

    /// Minimum number of bars required for calculation.
    fn min_periods(&self) -> usize;

    /// Calculate the indicator over the whole series.
    fn calculate(&self, series: &PriceSeries) -> Result<Self::Output, IndicatorError>;

    /// Fail with `InsufficientData` when the series is shorter than `min_periods`.
    fn ensure_len(&self, series: &PriceSeries) -> Result<(), IndicatorError> {
        if series.len() < self.min_periods() {
            return Err(IndicatorError::insufficient(
                self.id(),
                self.min_periods(),
                series.len(),
            ));
        }
        Ok(())
    }
}
