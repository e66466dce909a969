//! Yahoo Finance chart provider.
//!
//! Only the chart metadata is used, as a keyless last-resort source for
//! index levels such as `^VIX`.

mod models;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Serialize;

use crate::errors::MarketDataError;
use crate::upstream::{ttl, Upstream, UpstreamRequest};

use self::models::YahooChartResponse;
use super::build_client;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const PROVIDER_ID: &str = "YAHOO";

const TIMEOUT: Duration = Duration::from_secs(10);

/// Latest market price reported by the chart endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartQuote {
    pub symbol: String,
    pub price: f64,
    /// Unix milliseconds.
    pub timestamp: Option<i64>,
}

pub struct YahooClient {
    base_url: String,
    client: Client,
    upstream: Arc<Upstream>,
}

impl YahooClient {
    pub fn new(base_url: &str, upstream: Arc<Upstream>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client(TIMEOUT, HeaderMap::new()),
            upstream,
        }
    }

    pub async fn chart_quote(&self, symbol: &str) -> Result<ChartQuote, MarketDataError> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_url,
            urlencoding::encode(symbol)
        );
        let response: YahooChartResponse = self
            .upstream
            .fetch(&self.client, UpstreamRequest::get(PROVIDER_ID, url, ttl::QUOTE))
            .await?;

        let meta = response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|r| r.meta)
            .ok_or_else(|| MarketDataError::NoData(format!("Yahoo chart {}", symbol)))?;
        let price = meta
            .regular_market_price
            .ok_or_else(|| MarketDataError::NoData(format!("Yahoo price {}", symbol)))?;

        Ok(ChartQuote {
            symbol: meta.symbol.unwrap_or_else(|| symbol.to_string()),
            price,
            timestamp: meta.regular_market_time.map(|secs| secs * 1000),
        })
    }
}
