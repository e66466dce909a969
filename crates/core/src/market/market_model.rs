//! Market domain models and the EIA seasonal comparison.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use finmate_market_data::EiaObservation;
use serde::Serialize;

use crate::macro_data::Treasury;
use crate::utils::round_f64;

/// Weekly inventory series shown on the dashboard: key, EIA series key, unit.
pub const EIA_SERIES: [(&str, &str, &str); 5] = [
    ("crude_total", "petroleum/sum/sndw:WCRSTUS1", "kbbl"),
    ("crude_ex_spr", "petroleum/sum/sndw:WCESTUS1", "kbbl"),
    ("gasoline", "petroleum/sum/sndw:WGTSTUS1", "kbbl"),
    ("distillate", "petroleum/sum/sndw:WDISTUS1", "kbbl"),
    ("ng_storage", "natural-gas/stor/wkly", "Bcf"),
];

/// SPDR sector ETFs.
pub const SECTORS: [(&str, &str); 11] = [
    ("XLE", "Energy"),
    ("XLF", "Financials"),
    ("XLK", "Technology"),
    ("XLV", "Health Care"),
    ("XLU", "Utilities"),
    ("XLI", "Industrials"),
    ("XLY", "Consumer Discretionary"),
    ("XLP", "Consumer Staples"),
    ("XLRE", "Real Estate"),
    ("XLB", "Materials"),
    ("XLC", "Communication Services"),
];

/// Years averaged for the seasonal comparison.
const SEASONAL_YEARS: u32 = 5;
/// How far a past week may sit from the exact anniversary.
const SEASONAL_TOLERANCE_DAYS: i64 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TickerQuote {
    Price { price: f64, source: &'static str },
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub value: Option<f64>,
    pub unit: &'static str,
    pub vs5y_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDashboard {
    pub tickers: BTreeMap<String, TickerQuote>,
    pub treasury: Option<Treasury>,
    pub inventories: BTreeMap<String, Inventory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CycleEntry {
    Change {
        ticker: String,
        price: f64,
        d1: Option<f64>,
        d30: Option<f64>,
        d90: Option<f64>,
    },
    Error {
        ticker: String,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketCycles {
    pub data: BTreeMap<String, CycleEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum SectorEntry {
    Yield {
        sector: &'static str,
        price: f64,
        yield_pct: Option<f64>,
        samples: usize,
    },
    Error {
        sector: &'static str,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sectors {
    pub sectors: BTreeMap<String, SectorEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommodityPrice {
    pub date: NaiveDate,
    pub value: f64,
    pub unit: &'static str,
}

/// Latest commodity prices; a missing fact is omitted from the output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Commodities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coal: Option<CommodityPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wti: Option<CommodityPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brent: Option<CommodityPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub henry_hub: Option<CommodityPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uranium: Option<CommodityPrice>,
}

/// Mean of the observations nearest each of the last five anniversaries of
/// `latest`.
///
/// For each year `k` in 1..=5 the observation closest to `latest - k years`
/// is taken, provided it lies within three days. Years without a match are
/// skipped; `None` when no year matches.
pub fn five_year_average(history: &[EiaObservation], latest: NaiveDate) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0u32;

    for k in 1..=SEASONAL_YEARS {
        let Some(target) = latest.checked_sub_months(Months::new(12 * k)) else {
            continue;
        };
        let nearest = history
            .iter()
            .map(|o| (o, (o.period - target).num_days().abs()))
            .filter(|(_, distance)| *distance <= SEASONAL_TOLERANCE_DAYS)
            .min_by_key(|(_, distance)| *distance);
        if let Some((observation, _)) = nearest {
            sum += observation.value;
            count += 1;
        }
    }

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Percent above (positive) or below the seasonal average, 2 dp.
pub fn vs_five_year_pct(value: f64, average: f64) -> Option<f64> {
    if average == 0.0 {
        return None;
    }
    Some(round_f64((value - average) / average * 100.0, 2))
}
