//! Bureau of Labor Statistics timeseries provider.
//!
//! API documentation: https://www.bls.gov/developers/api_signature_v2.htm

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::MarketDataError;
use crate::upstream::{ttl, Upstream, UpstreamRequest};

use super::build_client;

pub const DEFAULT_BASE_URL: &str = "https://api.bls.gov";
pub const PROVIDER_ID: &str = "BLS";

/// CPI-U, all items, seasonally adjusted.
pub const CPI_SERIES: &str = "CUSR0000SA0";

const TIMEOUT: Duration = Duration::from_secs(12);
const TIMESERIES_PATH: &str = "/publicAPI/v2/timeseries/data/";

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    #[serde(rename = "Results")]
    results: Option<TimeseriesResults>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResults {
    #[serde(default)]
    series: Vec<TimeseriesSeries>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesSeries {
    #[serde(default)]
    data: Vec<RawDataPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataPoint {
    year: String,
    period: String,
    period_name: String,
    value: String,
}

/// One monthly observation, newest first in every returned list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub year: String,
    pub period: String,
    pub period_name: String,
    pub value: f64,
}

pub struct BlsClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    upstream: Arc<Upstream>,
}

impl BlsClient {
    /// The key is optional; BLS serves unregistered callers with a lower quota.
    pub fn new(base_url: &str, api_key: Option<String>, upstream: Arc<Upstream>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: build_client(TIMEOUT, HeaderMap::new()),
            upstream,
        }
    }

    /// Observations of `series_id`, newest first. Unparseable values are dropped.
    pub async fn series(&self, series_id: &str) -> Result<Vec<DataPoint>, MarketDataError> {
        let mut body = json!({ "seriesid": [series_id] });
        if let Some(key) = &self.api_key {
            body["registrationkey"] = json!(key);
        }
        let request = UpstreamRequest::post(
            PROVIDER_ID,
            format!("{}{}", self.base_url, TIMESERIES_PATH),
            body,
            ttl::SERIES,
        );
        let response: TimeseriesResponse = self.upstream.fetch(&self.client, request).await?;

        let data = response
            .results
            .and_then(|r| r.series.into_iter().next())
            .map(|s| s.data)
            .unwrap_or_default();

        Ok(data
            .into_iter()
            .filter_map(|raw| {
                let value = raw.value.trim().parse::<f64>().ok()?;
                Some(DataPoint {
                    year: raw.year,
                    period: raw.period,
                    period_name: raw.period_name,
                    value,
                })
            })
            .collect())
    }
}
