//! In-memory market data store.
//!
//! Holds the latest price series and put chain per ticker. Upstream fetching
//! is someone else's job; this store only receives and serves snapshots.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use crate::types::{OptionQuote, PriceSeries};

/// Canonical ticker form: trimmed and upper-cased.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Per-ticker price series and option chains.
///
/// Each ticker carries a generation that increases on every upload. Data is
/// stored before the generation moves, so a reader that sees generation `g`
/// also sees the data written with it.
#[derive(Default)]
pub struct MarketDataStore {
    series: DashMap<String, Arc<PriceSeries>>,
    puts: DashMap<String, Arc<Vec<OptionQuote>>>,
    generations: DashMap<String, u64>,
}

impl MarketDataStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace the series for its symbol.
    pub fn put_series(&self, series: PriceSeries) {
        let symbol = normalize_symbol(series.symbol());
        info!("Stored {} bars for {}", series.len(), symbol);
        self.series.insert(symbol.clone(), Arc::new(series));
        self.bump(symbol);
    }

    pub fn get_series(&self, symbol: &str) -> Option<Arc<PriceSeries>> {
        self.series
            .get(&normalize_symbol(symbol))
            .map(|entry| entry.value().clone())
    }

    /// Replace the put chain for a symbol.
    pub fn put_options(&self, symbol: &str, quotes: Vec<OptionQuote>) {
        let symbol = normalize_symbol(symbol);
        info!("Stored {} put quotes for {}", quotes.len(), symbol);
        self.puts.insert(symbol.clone(), Arc::new(quotes));
        self.bump(symbol);
    }

    pub fn get_options(&self, symbol: &str) -> Option<Arc<Vec<OptionQuote>>> {
        self.puts
            .get(&normalize_symbol(symbol))
            .map(|entry| entry.value().clone())
    }

    fn bump(&self, symbol: String) {
        *self.generations.entry(symbol).or_insert(0) += 1;
    }

    /// Upload generation for a symbol; 0 before any upload.
    pub fn generation(&self, symbol: &str) -> u64 {
        self.generations
            .get(&normalize_symbol(symbol))
            .map_or(0, |entry| *entry.value())
    }

    /// Tickers with a stored series, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.series.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceBar;
    use chrono::NaiveDate;

    fn one_bar_series(symbol: &str) -> PriceSeries {
        PriceSeries::new(
            symbol,
            vec![PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 0,
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("  aapl "), "AAPL");
    }

    #[test]
    fn test_series_lookup_is_case_insensitive() {
        let store = MarketDataStore::new();
        store.put_series(one_bar_series("msft"));
        assert!(store.get_series("MSFT").is_some());
        assert!(store.get_series("msft").is_some());
        assert!(store.get_series("AAPL").is_none());
        assert_eq!(store.symbols(), vec!["MSFT".to_string()]);
    }

    #[test]
    fn test_options_roundtrip() {
        let store = MarketDataStore::new();
        assert!(store.get_options("SMCI").is_none());
        store.put_options("smci", Vec::new());
        assert_eq!(store.get_options("SMCI").map(|q| q.len()), Some(0));
    }

    #[test]
    fn test_generation_moves_on_every_upload() {
        let store = MarketDataStore::new();
        assert_eq!(store.generation("AAPL"), 0);

        store.put_series(one_bar_series("aapl"));
        assert_eq!(store.generation("AAPL"), 1);
        store.put_options("AAPL", Vec::new());
        assert_eq!(store.generation("aapl"), 2);
        store.put_series(one_bar_series("AAPL"));
        assert_eq!(store.generation("AAPL"), 3);
        assert_eq!(store.generation("MSFT"), 0);
    }
}
