pub mod analysis;
pub mod cache;
pub mod indicators;
pub mod market_data;
pub mod options;

pub use analysis::AnalysisService;
pub use cache::Cache;
pub use indicators::{
    EmaClouds, HistoricalVolatility, Indicator, MysticPulse, SnapshotAnalyzer, SqueezeMomentum,
};
pub use market_data::{normalize_symbol, MarketDataStore};
pub use options::OptionsService;
