//! Rounding helpers shared by the aggregation services.

use chrono::{NaiveDate, Utc};
use rust_decimal::prelude::*;

/// Round half away from zero, the way money is displayed.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a per-share dividend amount.
pub fn round_dps(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a float to `dp` decimal places.
pub fn round_f64(value: f64, dp: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Percent change from `reference` to `value`, rounded to 2 dp.
///
/// `None` unless both are strictly positive.
pub fn pct_change(value: f64, reference: f64) -> Option<f64> {
    if value > 0.0 && reference > 0.0 {
        Some(round_f64((value - reference) / reference * 100.0, 2))
    } else {
        None
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Split a comma-separated ticker list, trimming and upper-casing each entry.
pub fn parse_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(2.344)), dec!(2.34));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_round_dps_keeps_four_places() {
        assert_eq!(round_dps(dec!(0.48512)), dec!(0.4851));
        assert_eq!(round_dps(dec!(0.48515)), dec!(0.4852));
    }

    #[test]
    fn test_parse_tickers() {
        assert_eq!(parse_tickers(" aapl, ,msft,"), vec!["AAPL", "MSFT"]);
        assert!(parse_tickers("").is_empty());
    }

    #[test]
    fn test_pct_change() {
        assert_eq!(pct_change(110.0, 100.0), Some(10.0));
        assert_eq!(pct_change(95.5, 100.0), Some(-4.5));
        assert_eq!(pct_change(100.0, 0.0), None);
        assert_eq!(pct_change(0.0, 100.0), None);
    }
}
