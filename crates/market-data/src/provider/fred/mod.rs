//! FRED (Federal Reserve Economic Data) provider.
//!
//! Used for treasury yields (DGS2, DGS10), money supply (M2SL) and
//! commodity spot series. API documentation:
//! https://fred.stlouisfed.org/docs/api/fred/series_observations.html

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;
use crate::upstream::{ttl, Upstream, UpstreamRequest};

use super::build_client;

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org";
pub const PROVIDER_ID: &str = "FRED";

const TIMEOUT: Duration = Duration::from_secs(12);
const OBSERVATIONS_PATH: &str = "/fred/series/observations";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

/// FRED reports values as strings, with "." for a missing observation.
#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

impl RawObservation {
    fn parse(&self) -> Option<Observation> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()?;
        let value = self.value.trim().parse::<f64>().ok()?;
        Some(Observation { date, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

pub struct FredClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    upstream: Arc<Upstream>,
}

impl FredClient {
    pub fn new(base_url: &str, api_key: Option<String>, upstream: Arc<Upstream>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: build_client(TIMEOUT, HeaderMap::new()),
            upstream,
        }
    }

    fn request(&self, series_id: &str, cache_for: Duration) -> Result<UpstreamRequest, MarketDataError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MarketDataError::MissingApiKey {
                provider: PROVIDER_ID.to_string(),
            })?;
        Ok(UpstreamRequest::get(
            PROVIDER_ID,
            format!("{}{}", self.base_url, OBSERVATIONS_PATH),
            cache_for,
        )
        .param("series_id", series_id)
        .param("api_key", api_key)
        .param("file_type", "json"))
    }

    /// Most recent non-missing observation of `series_id`.
    pub async fn latest(&self, series_id: &str) -> Result<Observation, MarketDataError> {
        let request = self
            .request(series_id, ttl::REFERENCE)?
            .param("sort_order", "desc")
            .param("limit", 1);
        let response: ObservationsResponse = self.upstream.fetch(&self.client, request).await?;

        response
            .observations
            .iter()
            .find_map(RawObservation::parse)
            .ok_or_else(|| MarketDataError::NoData(format!("FRED series {}", series_id)))
    }

    /// Full history of `series_id` in ascending date order, missing values dropped.
    pub async fn observations(
        &self,
        series_id: &str,
        frequency: Option<&str>,
    ) -> Result<Vec<Observation>, MarketDataError> {
        let mut request = self.request(series_id, ttl::SERIES)?;
        if let Some(frequency) = frequency {
            request = request.param("frequency", frequency);
        }
        let response: ObservationsResponse = self.upstream.fetch(&self.client, request).await?;

        Ok(response
            .observations
            .iter()
            .filter_map(RawObservation::parse)
            .collect())
    }
}
