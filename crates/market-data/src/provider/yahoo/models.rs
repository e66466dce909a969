//! Yahoo Finance chart API response models.

use serde::Deserialize;

/// Wrapper for /v8/finance/chart/{symbol}
#[derive(Debug, Deserialize)]
pub struct YahooChartResponse {
    pub chart: YahooChart,
}

#[derive(Debug, Deserialize)]
pub struct YahooChart {
    #[serde(default)]
    pub result: Option<Vec<YahooChartResult>>,
    // Note: error field exists in API but we handle errors via HTTP status/empty results
}

#[derive(Debug, Deserialize)]
pub struct YahooChartResult {
    pub meta: YahooChartMeta,
}

/// Only the live price fields of the chart metadata are read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooChartMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
    /// Unix seconds.
    pub regular_market_time: Option<i64>,
}
