//! Polygon.io API response models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response from /v2/aggs/ticker/{ticker}/prev
#[derive(Debug, Deserialize)]
pub(crate) struct AggsResponse {
    #[serde(default)]
    pub results: Vec<AggBar>,
}

/// Single aggregate bar; only close and timestamp are read.
#[derive(Debug, Deserialize)]
pub(crate) struct AggBar {
    /// Close price
    pub c: Option<f64>,
    /// Bar start (Unix ms)
    pub t: Option<i64>,
}

/// Response from /v3/reference/tickers
#[derive(Debug, Deserialize)]
pub(crate) struct TickersResponse {
    #[serde(default)]
    pub results: Vec<TickerRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TickerRef {
    pub ticker: String,
}

/// Response from /v3/reference/dividends
#[derive(Debug, Deserialize)]
pub(crate) struct DividendsResponse {
    #[serde(default)]
    pub results: Vec<DividendEvent>,
}

/// Response from /v2/reference/news
#[derive(Debug, Deserialize)]
pub(crate) struct NewsResponse {
    #[serde(default)]
    pub results: Vec<NewsArticle>,
}

/// Response from /v1/open-close/{ticker}/{date}
#[derive(Debug, Deserialize)]
pub(crate) struct OpenCloseResponse {
    pub close: Option<f64>,
}

/// Previous-day close for a ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct PrevClose {
    pub ticker: String,
    pub close: f64,
    /// Bar start in Unix milliseconds
    pub timestamp: Option<i64>,
}

/// A dividend declaration as reported by Polygon.
///
/// Field names follow the provider so the raw list can be passed through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub cash_amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub ex_dividend_date: Option<NaiveDate>,
    #[serde(default)]
    pub pay_date: Option<NaiveDate>,
    #[serde(default)]
    pub record_date: Option<NaiveDate>,
    #[serde(default)]
    pub declaration_date: Option<NaiveDate>,
    #[serde(default)]
    pub frequency: Option<u32>,
    #[serde(default)]
    pub dividend_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A news article. Only the fields we sort and categorise on are typed;
/// everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub published_utc: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
