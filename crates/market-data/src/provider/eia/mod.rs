//! U.S. Energy Information Administration (EIA) v2 provider.
//!
//! Weekly petroleum and natural gas inventories. A series is addressed by
//! a dataset route plus an optional `series` facet, written
//! `"petroleum/sum/sndw:WCRSTUS1"`.
//!
//! API documentation: https://www.eia.gov/opendata/documentation.php

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::upstream::{ttl, Upstream, UpstreamRequest};

use super::build_client;

pub const DEFAULT_BASE_URL: &str = "https://api.eia.gov";
pub const PROVIDER_ID: &str = "EIA";

const TIMEOUT: Duration = Duration::from_secs(12);

/// Rows requested when loading history for multi-year comparisons.
pub const HISTORY_LENGTH: u32 = 5000;

/// Dataset route and optional series facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesKey<'a> {
    pub dataset: &'a str,
    pub series: Option<&'a str>,
}

impl<'a> SeriesKey<'a> {
    pub fn parse(key: &'a str) -> Self {
        match key.split_once(':') {
            Some((dataset, series)) if !series.is_empty() => Self {
                dataset,
                series: Some(series),
            },
            Some((dataset, _)) => Self {
                dataset,
                series: None,
            },
            None => Self {
                dataset: key,
                series: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct DataResponse {
    response: Option<DataBody>,
}

#[derive(Debug, Deserialize)]
struct DataBody {
    #[serde(default)]
    data: Vec<RawRow>,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    period: String,
    /// EIA sends numbers for some datasets and strings for others.
    value: Option<Value>,
}

impl RawRow {
    fn parse(&self) -> Option<Observation> {
        let period = NaiveDate::parse_from_str(&self.period, "%Y-%m-%d").ok()?;
        let value = match self.value.as_ref()? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        Some(Observation { period, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub period: NaiveDate,
    pub value: f64,
}

pub struct EiaClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    upstream: Arc<Upstream>,
}

impl EiaClient {
    pub fn new(base_url: &str, api_key: Option<String>, upstream: Arc<Upstream>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: build_client(TIMEOUT, HeaderMap::new()),
            upstream,
        }
    }

    async fn weekly(
        &self,
        key: SeriesKey<'_>,
        length: u32,
        cache_for: Duration,
    ) -> Result<Vec<Observation>, MarketDataError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MarketDataError::MissingApiKey {
                provider: PROVIDER_ID.to_string(),
            })?;

        let url = format!("{}/v2/{}/data/", self.base_url, key.dataset);
        let mut request = UpstreamRequest::get(PROVIDER_ID, url, cache_for)
            .param("api_key", api_key)
            .param("frequency", "weekly")
            .param("data[0]", "value")
            .param("sort[0][column]", "period")
            .param("sort[0][direction]", "desc")
            .param("offset", 0)
            .param("length", length);
        if let Some(series) = key.series {
            request = request.param("facets[series][]", series);
        }

        let response: DataResponse = self.upstream.fetch(&self.client, request).await?;
        Ok(response
            .response
            .map(|body| body.data.iter().filter_map(RawRow::parse).collect())
            .unwrap_or_default())
    }

    /// Most recent weekly observation.
    pub async fn latest(&self, key: &str) -> Result<Observation, MarketDataError> {
        self.weekly(SeriesKey::parse(key), 1, ttl::SERIES)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::NoData(format!("EIA series {}", key)))
    }

    /// Weekly history, newest first.
    pub async fn history(&self, key: &str) -> Result<Vec<Observation>, MarketDataError> {
        self.weekly(SeriesKey::parse(key), HISTORY_LENGTH, ttl::SERIES_HISTORY)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_series_key_parsing() {
        assert_eq!(
            SeriesKey::parse("petroleum/sum/sndw:WCRSTUS1"),
            SeriesKey {
                dataset: "petroleum/sum/sndw",
                series: Some("WCRSTUS1")
            }
        );
        assert_eq!(
            SeriesKey::parse("natural-gas/stor/wkly"),
            SeriesKey {
                dataset: "natural-gas/stor/wkly",
                series: None
            }
        );
    }

    #[tokio::test]
    async fn test_latest_accepts_string_and_number_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/petroleum/sum/sndw/data/"))
            .and(query_param("facets[series][]", "WCRSTUS1"))
            .and(query_param("length", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": {"data": [{"period": "2024-05-31", "value": "454700"}]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/natural-gas/stor/wkly/data/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": {"data": [{"period": "2024-05-31", "value": 2795}]}
            })))
            .mount(&server)
            .await;

        let eia = EiaClient::new(
            &server.uri(),
            Some("k".to_string()),
            Arc::new(Upstream::default()),
        );
        let crude = eia.latest("petroleum/sum/sndw:WCRSTUS1").await.unwrap();
        assert_eq!(crude.value, 454700.0);
        let gas = eia.latest("natural-gas/stor/wkly").await.unwrap();
        assert_eq!(gas.value, 2795.0);
        assert_eq!(gas.period, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
    }

    #[tokio::test]
    async fn test_missing_key() {
        let eia = EiaClient::new("http://127.0.0.1:9", None, Arc::new(Upstream::default()));
        let err = eia.history("natural-gas/stor/wkly").await.unwrap_err();
        assert!(matches!(err, MarketDataError::MissingApiKey { .. }));
    }
}
