//! Options Service
//!
//! Put-side option analytics for cash-secured-put selection:
//! - Black-Scholes put delta
//! - Expiry selection around a target days-to-expiration
//! - Search for the out-of-the-money put nearest a target delta
//! - Seller ROI and annualized ROI

use std::collections::BTreeSet;
use std::f64::consts::E;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::VolatilityParams;
use crate::types::{DeltaCandidate, OptionQuote};

const CANDIDATE_COUNT: usize = 5;
/// Share of the last trade used as the bid when no bid is quoted.
const BID_FALLBACK_RATIO: f64 = 0.95;

/// Options pricing calculator.
#[derive(Debug, Clone, Copy)]
pub struct OptionsService {
    /// Risk-free interest rate (annual, as decimal)
    risk_free_rate: f64,
}

impl OptionsService {
    /// Create a new options service with the given risk-free rate.
    pub fn new(risk_free_rate: f64) -> Self {
        Self { risk_free_rate }
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Calculate d1 parameter for Black-Scholes.
    fn d1(&self, spot: f64, strike: f64, time: f64, volatility: f64) -> f64 {
        let r = self.risk_free_rate;
        (f64::ln(spot / strike) + (r + volatility.powi(2) / 2.0) * time) / (volatility * time.sqrt())
    }

    /// Black-Scholes put delta, `N(d1) - 1`.
    ///
    /// Non-positive spot, strike, time or volatility yields 0.
    pub fn put_delta(&self, spot: f64, strike: f64, time_years: f64, volatility: f64) -> f64 {
        if spot <= 0.0 || strike <= 0.0 || time_years <= 0.0 || volatility <= 0.0 {
            return 0.0;
        }
        norm_cdf(self.d1(spot, strike, time_years, volatility)) - 1.0
    }

    /// Rank out-of-the-money puts (`strike < spot`) by distance from
    /// `target_delta`, closest first. Ties keep chain order. Puts whose delta
    /// rounds to 0 are skipped.
    pub fn rank_puts(
        &self,
        quotes: &[OptionQuote],
        spot: f64,
        dte: i64,
        params: &VolatilityParams,
    ) -> Vec<DeltaCandidate> {
        let time_years = dte as f64 / 365.0;

        let mut ranked: Vec<DeltaCandidate> = quotes
            .iter()
            .filter(|q| q.strike < spot)
            .map(|q| {
                let sigma = if q.implied_volatility > 0.0 {
                    q.implied_volatility
                } else {
                    params.fallback_iv
                };
                let delta = self.put_delta(spot, q.strike, time_years, sigma);
                let (roi, roi_annual) = seller_roi(q, dte);

                DeltaCandidate {
                    strike: q.strike,
                    delta,
                    bid: q.bid,
                    ask: q.ask,
                    last_price: q.last_price,
                    implied_volatility: q.implied_volatility,
                    open_interest: q.open_interest,
                    roi,
                    roi_annual,
                }
            })
            .filter(|c| c.delta < 0.0)
            .collect();

        let distance = |c: &DeltaCandidate| (c.delta - params.target_delta).abs();
        ranked.sort_by(|a, b| distance(a).total_cmp(&distance(b)));

        debug!(
            "Ranked {} OTM puts at spot {:.2}, {} DTE",
            ranked.len(),
            spot,
            dte
        );
        ranked.truncate(CANDIDATE_COUNT);
        ranked
    }
}

impl Default for OptionsService {
    fn default() -> Self {
        Self::new(crate::config::RISK_FREE_RATE)
    }
}

/// Seller ROI in percent and its annualized form.
///
/// Falls back to 95% of the last price when no bid is quoted.
pub fn seller_roi(quote: &OptionQuote, dte: i64) -> (f64, f64) {
    let premium = if quote.bid > 0.0 {
        quote.bid
    } else {
        quote.last_price * BID_FALLBACK_RATIO
    };
    if quote.strike <= 0.0 {
        return (0.0, 0.0);
    }

    let roi = premium / quote.strike * 100.0;
    let annual = if dte > 0 { roi * (365.0 / dte as f64) } else { 0.0 };
    (roi, annual)
}

/// Pick the expiry whose DTE is closest to the target inside
/// `[min_dte, max_dte]`. Ties go to the earlier expiry.
pub fn select_expiry(
    expiries: &BTreeSet<NaiveDate>,
    as_of: NaiveDate,
    params: &VolatilityParams,
) -> Option<(NaiveDate, i64)> {
    expiries
        .iter()
        .map(|&expiry| (expiry, (expiry - as_of).num_days()))
        .filter(|(_, dte)| (params.min_dte..=params.max_dte).contains(dte))
        .min_by_key(|(_, dte)| (dte - params.target_dte).abs())
}

/// Distinct expiries present in a chain.
pub fn expiries(quotes: &[OptionQuote]) -> BTreeSet<NaiveDate> {
    quotes.iter().map(|q| q.expiry).collect()
}

/// Implied volatility of the put struck nearest to spot, skipping quotes
/// without a positive IV.
pub fn near_the_money_iv(quotes: &[OptionQuote], spot: f64) -> Option<f64> {
    quotes
        .iter()
        .filter(|q| q.implied_volatility > 0.0)
        .min_by(|a, b| (a.strike - spot).abs().total_cmp(&(b.strike - spot).abs()))
        .map(|q| q.implied_volatility)
}

/// Standard normal cumulative distribution function.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / 2.0_f64.sqrt()))
}

/// Error function approximation for normal CDF.
fn erf(x: f64) -> f64 {
    // Abramowitz-Stegun 7.1.26
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * E.powf(-x * x);

    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(strike: f64, bid: f64, iv: f64, expiry: NaiveDate) -> OptionQuote {
        OptionQuote {
            strike,
            bid,
            ask: bid + 0.1,
            last_price: bid,
            implied_volatility: iv,
            open_interest: 100,
            expiry,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_norm_cdf() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((norm_cdf(1.96) - 0.975).abs() < 1e-4);
        assert!((norm_cdf(-1.96) - 0.025).abs() < 1e-4);
    }

    #[test]
    fn test_put_delta_reference_value() {
        let service = OptionsService::new(0.045);
        let delta = service.put_delta(100.0, 90.0, 30.0 / 365.0, 0.5);
        assert!((delta - (-0.203)).abs() < 0.005, "delta was {}", delta);
    }

    #[test]
    fn test_put_delta_degenerate_inputs() {
        let service = OptionsService::default();
        assert_eq!(service.put_delta(100.0, 90.0, 0.0, 0.5), 0.0);
        assert_eq!(service.put_delta(100.0, 90.0, 0.1, 0.0), 0.0);
        assert_eq!(service.put_delta(0.0, 90.0, 0.1, 0.5), 0.0);
        assert_eq!(service.put_delta(100.0, -1.0, 0.1, 0.5), 0.0);
    }

    #[test]
    fn test_put_delta_bounds() {
        let service = OptionsService::default();
        for strike in [50.0, 80.0, 100.0, 120.0] {
            let delta = service.put_delta(100.0, strike, 0.1, 0.4);
            assert!((-1.0..=0.0).contains(&delta));
        }
    }

    #[test]
    fn test_seller_roi() {
        let expiry = date(2025, 1, 31);
        let (roi, annual) = seller_roi(&put(100.0, 2.0, 0.3, expiry), 30);
        assert!((roi - 2.0).abs() < 1e-9);
        assert!((annual - 2.0 * 365.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_seller_roi_bid_fallback() {
        let mut quote = put(100.0, 0.0, 0.3, date(2025, 1, 31));
        quote.last_price = 2.0;
        let (roi, _) = seller_roi(&quote, 30);
        assert!((roi - 1.9).abs() < 1e-9);
    }

    #[test]
    fn test_select_expiry_within_window() {
        let as_of = date(2025, 1, 1);
        let expiries: BTreeSet<NaiveDate> =
            [date(2025, 1, 3), date(2025, 1, 24), date(2025, 2, 7), date(2025, 4, 1)]
                .into_iter()
                .collect();
        let params = VolatilityParams::default();
        // 2 DTE and 90 DTE are outside [7, 60]; 23 vs 37 DTE are both 7 away.
        assert_eq!(
            select_expiry(&expiries, as_of, &params),
            Some((date(2025, 1, 24), 23))
        );
    }

    #[test]
    fn test_select_expiry_none_in_window() {
        let expiries: BTreeSet<NaiveDate> = [date(2025, 1, 3)].into_iter().collect();
        assert_eq!(
            select_expiry(&expiries, date(2025, 1, 1), &VolatilityParams::default()),
            None
        );
    }

    #[test]
    fn test_rank_puts_otm_only_and_closest_first() {
        let expiry = date(2025, 1, 31);
        let quotes = vec![
            put(80.0, 0.3, 0.5, expiry),
            put(90.0, 1.0, 0.5, expiry),
            put(95.0, 2.0, 0.5, expiry),
            put(105.0, 6.0, 0.5, expiry),
        ];
        let service = OptionsService::new(0.045);
        let ranked = service.rank_puts(&quotes, 100.0, 30, &VolatilityParams::default());

        assert!(ranked.iter().all(|c| c.strike < 100.0));
        assert_eq!(ranked.len(), 3);
        let distances: Vec<f64> = ranked.iter().map(|c| (c.delta + 0.30).abs()).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_rank_puts_uses_fallback_iv() {
        let expiry = date(2025, 1, 31);
        let service = OptionsService::new(0.045);
        let ranked = service.rank_puts(
            &[put(90.0, 1.0, 0.0, expiry)],
            100.0,
            30,
            &VolatilityParams::default(),
        );
        let expected = service.put_delta(100.0, 90.0, 30.0 / 365.0, 0.5);
        assert!((ranked[0].delta - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rank_puts_skips_zero_delta() {
        let expiry = date(2025, 1, 31);
        let service = OptionsService::new(0.045);
        // Far enough out of the money that N(d1) is exactly 1.
        let far = put(1.0, 0.01, 0.1, expiry);
        assert_eq!(service.put_delta(100.0, 1.0, 30.0 / 365.0, 0.1), 0.0);

        let ranked = service.rank_puts(&[far.clone()], 100.0, 30, &VolatilityParams::default());
        assert!(ranked.is_empty());

        let ranked = service.rank_puts(
            &[far, put(90.0, 1.0, 0.5, expiry)],
            100.0,
            30,
            &VolatilityParams::default(),
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].strike, 90.0);
    }

    #[test]
    fn test_near_the_money_iv() {
        let expiry = date(2025, 1, 31);
        let quotes = vec![
            put(90.0, 1.0, 0.40, expiry),
            put(99.0, 1.0, 0.0, expiry),
            put(101.0, 1.0, 0.35, expiry),
        ];
        assert_eq!(near_the_money_iv(&quotes, 100.0), Some(0.35));
        assert_eq!(near_the_money_iv(&[], 100.0), None);
    }
}
