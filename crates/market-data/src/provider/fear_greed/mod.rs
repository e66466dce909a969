//! CNN Fear & Greed index via RapidAPI.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::MarketDataError;
use crate::upstream::{ttl, Upstream, UpstreamRequest};

use super::build_client;

pub const DEFAULT_BASE_URL: &str = "https://fear-and-greed-index.p.rapidapi.com";
pub const PROVIDER_ID: &str = "FEAR_GREED";

const RAPIDAPI_HOST: &str = "fear-and-greed-index.p.rapidapi.com";
const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct FgiResponse {
    fgi: Option<Fgi>,
}

#[derive(Debug, Deserialize)]
struct Fgi {
    now: Option<FgiReading>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FgiReading {
    value: Option<f64>,
    value_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FearGreed {
    pub value: f64,
    pub label: Option<String>,
}

pub struct FearGreedClient {
    base_url: String,
    client: Option<Client>,
    upstream: Arc<Upstream>,
}

impl FearGreedClient {
    /// Without a key the client stays inert and every call reports
    /// [`MarketDataError::MissingApiKey`].
    pub fn new(base_url: &str, api_key: Option<&str>, upstream: Arc<Upstream>) -> Self {
        let client = api_key.and_then(|key| {
            let mut headers = HeaderMap::new();
            match HeaderValue::from_str(key) {
                Ok(value) => {
                    headers.insert("X-RapidAPI-Key", value);
                    headers.insert("X-RapidAPI-Host", HeaderValue::from_static(RAPIDAPI_HOST));
                    Some(build_client(TIMEOUT, headers))
                }
                Err(_) => {
                    warn!("RapidAPI key is not a valid header value");
                    None
                }
            }
        });

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            upstream,
        }
    }

    pub async fn current(&self) -> Result<FearGreed, MarketDataError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| MarketDataError::MissingApiKey {
                provider: PROVIDER_ID.to_string(),
            })?;

        let url = format!("{}/v1/fgi", self.base_url);
        let response: FgiResponse = self
            .upstream
            .fetch(client, UpstreamRequest::get(PROVIDER_ID, url, ttl::REFERENCE))
            .await?;

        let reading = response
            .fgi
            .and_then(|f| f.now)
            .ok_or_else(|| MarketDataError::NoData("Fear & Greed index".to_string()))?;
        let value = reading
            .value
            .ok_or_else(|| MarketDataError::NoData("Fear & Greed value".to_string()))?;

        Ok(FearGreed {
            value,
            label: reading.value_text,
        })
    }
}
