//! Dividend domain models and the pure calculations over them.

use chrono::{Duration, NaiveDate};
use finmate_market_data::DividendEvent;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::round_dps;

/// Days of declarations fetched for a TTM calculation.
pub const TTM_FETCH_DAYS: i64 = 730;
/// Days counted into the trailing-twelve-month sum.
pub const TTM_WINDOW_DAYS: i64 = 365;
pub const TTM_FETCH_LIMIT: u32 = 500;
/// Events returned by the raw per-ticker listing.
pub const LIST_LIMIT: u32 = 200;
/// Events fetched per ticker when building the calendar.
pub const CALENDAR_FETCH_LIMIT: u32 = 100;

/// One paid dividend: ex-date and cash amount per share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendPoint {
    pub ex_date: NaiveDate,
    pub amount: Decimal,
}

/// Trailing-twelve-month dividend per share plus the events behind it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendTtm {
    pub dps_ttm: Decimal,
    /// Usable events in the two-year fetch window.
    pub samples: usize,
    pub history: Vec<DividendPoint>,
}

/// An upcoming ex-dividend date for a portfolio ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub ticker: String,
    pub ex_date: NaiveDate,
    pub pay_date: Option<NaiveDate>,
    pub record_date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub frequency: Option<u32>,
    pub declaration_date: Option<NaiveDate>,
}

/// Sum the cash amounts whose ex-date falls within the last 365 days.
///
/// `events` is the two-year fetch; events without an amount or ex-date are
/// dropped before counting. No frequency normalisation is applied.
pub fn summarize_ttm(events: &[DividendEvent], today: NaiveDate) -> DividendTtm {
    let history: Vec<DividendPoint> = events
        .iter()
        .filter_map(|e| {
            let ex_date = e.ex_dividend_date?;
            let amount = Decimal::from_f64(e.cash_amount?)?;
            Some(DividendPoint { ex_date, amount })
        })
        .collect();

    let cutoff = today - Duration::days(TTM_WINDOW_DAYS);
    let dps_ttm: Decimal = history
        .iter()
        .filter(|p| p.ex_date >= cutoff)
        .map(|p| p.amount)
        .sum();

    DividendTtm {
        dps_ttm: round_dps(dps_ttm),
        samples: history.len(),
        history,
    }
}

/// Calendar entries for `ticker` with an ex-date on or after `today`.
pub fn upcoming_entries(
    ticker: &str,
    events: &[DividendEvent],
    today: NaiveDate,
) -> Vec<CalendarEntry> {
    events
        .iter()
        .filter_map(|e| {
            let ex_date = e.ex_dividend_date.filter(|d| *d >= today)?;
            Some(CalendarEntry {
                ticker: ticker.to_string(),
                ex_date,
                pay_date: e.pay_date,
                record_date: e.record_date,
                amount: e.cash_amount,
                frequency: e.frequency,
                declaration_date: e.declaration_date,
            })
        })
        .collect()
}
