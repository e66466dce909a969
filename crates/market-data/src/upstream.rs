//! Gateway shared by every provider client.
//!
//! A request goes through three stages:
//!
//! ```text
//! cache lookup --miss--> limiter slot --> retry(send) --ok--> cache store
//! ```
//!
//! The cache, limiter and retry policy are owned by one explicitly
//! constructed [`Upstream`] value; there is no process-wide state.

use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::backoff::{with_retry, RetryPolicy};
use crate::cache::TtlCache;
use crate::errors::MarketDataError;
use crate::limiter::ConcurrencyLimiter;

/// Cache lifetimes per kind of data.
pub mod ttl {
    use std::time::Duration;

    /// Live quotes and daily closes.
    pub const QUOTE: Duration = Duration::from_secs(30);
    /// News feeds and raw dividend lists.
    pub const NEWS: Duration = Duration::from_secs(60);
    /// Ticker search, dividend TTM windows, latest statistical observation.
    pub const REFERENCE: Duration = Duration::from_secs(120);
    /// Monthly and weekly series (CPI, M2, latest inventories).
    pub const SERIES: Duration = Duration::from_secs(300);
    /// Multi-year series history.
    pub const SERIES_HISTORY: Duration = Duration::from_secs(600);
}

/// One upstream HTTP call, described independently of the client sending it.
#[derive(Clone, Debug)]
pub struct UpstreamRequest {
    pub provider: &'static str,
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub ttl: Duration,
}

impl UpstreamRequest {
    pub fn get(provider: &'static str, url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            provider,
            method: Method::GET,
            url: url.into(),
            query: Vec::new(),
            body: None,
            ttl,
        }
    }

    pub fn post(provider: &'static str, url: impl Into<String>, body: Value, ttl: Duration) -> Self {
        Self {
            provider,
            method: Method::POST,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
            ttl,
        }
    }

    /// Append a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Request signature: method, provider, URL and parameters.
    pub fn cache_key(&self) -> String {
        let query = serde_json::to_string(&self.query).unwrap_or_default();
        let body = self
            .body
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_default();
        format!(
            "{}:{}:{}:{}:{}",
            self.method, self.provider, self.url, query, body
        )
    }
}

pub struct Upstream {
    cache: TtlCache<Value>,
    limiter: ConcurrencyLimiter,
    retry: RetryPolicy,
}

impl Upstream {
    pub fn new(cache: TtlCache<Value>, limiter: ConcurrencyLimiter, retry: RetryPolicy) -> Self {
        Self {
            cache,
            limiter,
            retry,
        }
    }

    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    /// Fetch a JSON payload, serving it from cache while fresh.
    pub async fn fetch_json(
        &self,
        client: &Client,
        request: UpstreamRequest,
    ) -> Result<Value, MarketDataError> {
        let key = request.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let value = self
            .limiter
            .schedule(with_retry(&self.retry, || send(client, &request)))
            .await?;

        self.cache.set(key, value.clone(), request.ttl);
        Ok(value)
    }

    /// Fetch and deserialize into `T`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        client: &Client,
        request: UpstreamRequest,
    ) -> Result<T, MarketDataError> {
        let provider = request.provider;
        let value = self.fetch_json(client, request).await?;
        serde_json::from_value(value)
            .map_err(|e| MarketDataError::invalid_payload(provider, e.to_string()))
    }
}

impl Default for Upstream {
    fn default() -> Self {
        Self::new(
            TtlCache::new(),
            ConcurrencyLimiter::default(),
            RetryPolicy::default(),
        )
    }
}

async fn send(client: &Client, request: &UpstreamRequest) -> Result<Value, MarketDataError> {
    debug!("{} {} {}", request.provider, request.method, request.url);

    let mut builder = client
        .request(request.method.clone(), &request.url)
        .query(&request.query);
    if let Some(body) = &request.body {
        builder = builder.json(body);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| MarketDataError::from_transport(request.provider, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MarketDataError::from_status(request.provider, status));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| MarketDataError::invalid_payload(request.provider, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_upstream(clock: Arc<ManualClock>) -> Upstream {
        Upstream::new(
            TtlCache::with_clock(clock),
            ConcurrencyLimiter::new(4),
            RetryPolicy::new(3, Duration::from_millis(1)),
        )
    }

    #[test]
    fn test_cache_key_includes_params() {
        let a = UpstreamRequest::get("POLYGON", "http://x/news", ttl::NEWS).param("ticker", "AAPL");
        let b = UpstreamRequest::get("POLYGON", "http://x/news", ttl::NEWS).param("ticker", "MSFT");
        assert_ne!(a.cache_key(), b.cache_key());
        assert!(a.cache_key().starts_with("GET:POLYGON:http://x/news"));
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/series"))
            .and(query_param("id", "DGS10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"v": 4.2})))
            .expect(1)
            .mount(&server)
            .await;

        let clock = Arc::new(ManualClock::new());
        let upstream = fast_upstream(clock.clone());
        let client = Client::new();
        let request = || {
            UpstreamRequest::get("FRED", format!("{}/series", server.uri()), ttl::REFERENCE)
                .param("id", "DGS10")
        };

        let first = upstream.fetch_json(&client, request()).await.unwrap();
        let second = upstream.fetch_json(&client, request()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first["v"], json!(4.2));
    }

    #[tokio::test]
    async fn test_expired_entry_goes_upstream_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"c": 1})))
            .expect(2)
            .mount(&server)
            .await;

        let clock = Arc::new(ManualClock::new());
        let upstream = fast_upstream(clock.clone());
        let client = Client::new();
        let url = format!("{}/quote", server.uri());

        upstream
            .fetch_json(&client, UpstreamRequest::get("POLYGON", &url, ttl::QUOTE))
            .await
            .unwrap();
        clock.advance(ttl::QUOTE + Duration::from_secs(1));
        upstream
            .fetch_json(&client, UpstreamRequest::get("POLYGON", &url, ttl::QUOTE))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_surface() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let upstream = fast_upstream(Arc::new(ManualClock::new()));
        let result = upstream
            .fetch_json(
                &Client::new(),
                UpstreamRequest::get("EIA", server.uri(), ttl::SERIES),
            )
            .await;

        assert!(matches!(result, Err(MarketDataError::ProviderError { .. })));
        assert!(upstream.cache().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let upstream = fast_upstream(Arc::new(ManualClock::new()));
        let result = upstream
            .fetch_json(
                &Client::new(),
                UpstreamRequest::get("POLYGON", server.uri(), ttl::QUOTE),
            )
            .await;

        assert!(matches!(
            result,
            Err(MarketDataError::ClientError { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_post_body_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bls"))
            .and(wiremock::matchers::body_json(json!({"seriesid": ["X"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let upstream = fast_upstream(Arc::new(ManualClock::new()));
        let value = upstream
            .fetch_json(
                &Client::new(),
                UpstreamRequest::post(
                    "BLS",
                    format!("{}/bls", server.uri()),
                    json!({"seriesid": ["X"]}),
                    ttl::SERIES,
                ),
            )
            .await
            .unwrap();
        assert_eq!(value["ok"], json!(true));
    }
}
