//! Polygon.io pricing provider.
//!
//! This module provides:
//! - Previous-day close via /v2/aggs/ticker/{ticker}/prev
//! - Daily close on a given date via /v1/open-close
//! - Ticker search via /v3/reference/tickers
//! - Dividend declarations via /v3/reference/dividends
//! - News via /v2/reference/news
//!
//! API documentation: https://polygon.io/docs/stocks

mod models;

pub use models::{DividendEvent, NewsArticle, PrevClose};

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use tracing::warn;

use crate::errors::MarketDataError;
use crate::upstream::{ttl, Upstream, UpstreamRequest};

use self::models::{AggsResponse, DividendsResponse, NewsResponse, OpenCloseResponse, TickersResponse};
use super::build_client;

pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";
pub const STOCKS_PROVIDER_ID: &str = "POLYGON";
pub const INDEX_PROVIDER_ID: &str = "POLYGON_INDEX";

const TIMEOUT: Duration = Duration::from_secs(10);

/// Polygon client bound to one API key.
///
/// The stocks and index plans use separate keys, so two clients with
/// different ids may exist side by side; the id keeps their cache entries apart.
pub struct PolygonClient {
    id: &'static str,
    base_url: String,
    client: Client,
    upstream: Arc<Upstream>,
}

impl PolygonClient {
    pub fn new(id: &'static str, base_url: &str, api_key: &str, upstream: Arc<Upstream>) -> Self {
        let mut headers = HeaderMap::new();
        match HeaderValue::from_str(&format!("Bearer {}", api_key)) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Polygon API key for {} is not a valid header value", id),
        }

        Self {
            id,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client(TIMEOUT, headers),
            upstream,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Previous trading day's close.
    pub async fn previous_close(&self, ticker: &str) -> Result<PrevClose, MarketDataError> {
        let path = format!("/v2/aggs/ticker/{}/prev", urlencoding::encode(ticker));
        let response: AggsResponse = self
            .upstream
            .fetch(&self.client, UpstreamRequest::get(self.id, self.url(&path), ttl::QUOTE))
            .await?;

        let bar = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::NoData(format!("No previous close for {}", ticker)))?;
        let close = bar
            .c
            .ok_or_else(|| MarketDataError::NoData(format!("No close price for {}", ticker)))?;

        Ok(PrevClose {
            ticker: ticker.to_string(),
            close,
            timestamp: bar.t,
        })
    }

    /// Close on `date`, or `None` when the market did not trade that day.
    pub async fn daily_close(
        &self,
        ticker: &str,
        date: NaiveDate,
    ) -> Result<Option<f64>, MarketDataError> {
        let path = format!(
            "/v1/open-close/{}/{}",
            urlencoding::encode(ticker),
            date.format("%Y-%m-%d")
        );
        let response: OpenCloseResponse = self
            .upstream
            .fetch(&self.client, UpstreamRequest::get(self.id, self.url(&path), ttl::QUOTE))
            .await?;
        Ok(response.close)
    }

    /// First ticker matching a free-text search; no disambiguation.
    pub async fn search_ticker(&self, query: &str) -> Result<Option<String>, MarketDataError> {
        let request = UpstreamRequest::get(self.id, self.url("/v3/reference/tickers"), ttl::REFERENCE)
            .param("search", query)
            .param("market", "stocks")
            .param("limit", 1);
        let response: TickersResponse = self.upstream.fetch(&self.client, request).await?;
        Ok(response
            .results
            .into_iter()
            .next()
            .map(|t| t.ticker.to_uppercase()))
    }

    /// Dividend declarations, newest first.
    ///
    /// `window` bounds the ex-dividend date (inclusive on both ends).
    pub async fn dividends(
        &self,
        ticker: &str,
        limit: u32,
        window: Option<(NaiveDate, NaiveDate)>,
        cache_for: Duration,
    ) -> Result<Vec<DividendEvent>, MarketDataError> {
        let mut request =
            UpstreamRequest::get(self.id, self.url("/v3/reference/dividends"), cache_for)
                .param("ticker", ticker.to_uppercase())
                .param("order", "desc")
                .param("limit", limit);
        if let Some((from, to)) = window {
            request = request
                .param("ex_dividend_date.gte", from.format("%Y-%m-%d"))
                .param("ex_dividend_date.lte", to.format("%Y-%m-%d"));
        }

        let response: DividendsResponse = self.upstream.fetch(&self.client, request).await?;
        Ok(response.results)
    }

    /// Latest news for `ticker`, newest first.
    pub async fn news(&self, ticker: &str, limit: u32) -> Result<Vec<NewsArticle>, MarketDataError> {
        let request = UpstreamRequest::get(self.id, self.url("/v2/reference/news"), ttl::NEWS)
            .param("ticker", ticker)
            .param("limit", limit)
            .param("order", "desc");
        let response: NewsResponse = self.upstream.fetch(&self.client, request).await?;
        Ok(response.results)
    }
}
