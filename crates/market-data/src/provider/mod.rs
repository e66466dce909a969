//! Upstream provider clients.
//!
//! Each client wraps one HTTP API, owns a `reqwest::Client` with that
//! API's timeout and auth, and sends every request through the shared
//! [`Upstream`] gateway.
//!
//! | Provider    | Used for                                  | Key           |
//! |-------------|-------------------------------------------|---------------|
//! | Polygon     | quotes, closes, search, dividends, news   | required      |
//! | FRED        | treasury yields, M2, commodity spot       | optional      |
//! | BLS         | CPI                                       | optional      |
//! | EIA         | weekly energy inventories                 | optional      |
//! | Yahoo       | index fallback (VIX)                      | none          |
//! | Fear & Greed| sentiment                                 | optional      |

pub mod bls;
pub mod eia;
pub mod fear_greed;
pub mod fred;
pub mod polygon;
pub mod yahoo;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT as USER_AGENT_HEADER};
use reqwest::Client;

use crate::upstream::Upstream;

use self::bls::BlsClient;
use self::eia::EiaClient;
use self::fear_greed::FearGreedClient;
use self::fred::FredClient;
use self::polygon::PolygonClient;
use self::yahoo::YahooClient;

pub const USER_AGENT: &str = "FinMate/1.0";

/// Build a `reqwest::Client` with a fixed timeout, user agent and extra headers.
pub(crate) fn build_client(timeout: Duration, mut headers: HeaderMap) -> Client {
    headers.insert(USER_AGENT_HEADER, HeaderValue::from_static(USER_AGENT));
    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// API keys and base URLs for every provider.
///
/// Base URLs default to the public endpoints and are overridable so tests
/// can point clients at a local mock server.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub polygon_stocks_key: String,
    pub polygon_index_key: Option<String>,
    pub fred_api_key: Option<String>,
    pub bls_api_key: Option<String>,
    pub eia_api_key: Option<String>,
    pub rapidapi_key: Option<String>,
    pub polygon_base_url: String,
    pub fred_base_url: String,
    pub bls_base_url: String,
    pub eia_base_url: String,
    pub yahoo_base_url: String,
    pub fear_greed_base_url: String,
}

impl ProviderSettings {
    /// Settings with the public base URLs and only the Polygon stocks key.
    pub fn new(polygon_stocks_key: impl Into<String>) -> Self {
        Self {
            polygon_stocks_key: polygon_stocks_key.into(),
            polygon_index_key: None,
            fred_api_key: None,
            bls_api_key: None,
            eia_api_key: None,
            rapidapi_key: None,
            polygon_base_url: polygon::DEFAULT_BASE_URL.to_string(),
            fred_base_url: fred::DEFAULT_BASE_URL.to_string(),
            bls_base_url: bls::DEFAULT_BASE_URL.to_string(),
            eia_base_url: eia::DEFAULT_BASE_URL.to_string(),
            yahoo_base_url: yahoo::DEFAULT_BASE_URL.to_string(),
            fear_greed_base_url: fear_greed::DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point every provider at the same base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.polygon_base_url = base_url.to_string();
        self.fred_base_url = base_url.to_string();
        self.bls_base_url = base_url.to_string();
        self.eia_base_url = base_url.to_string();
        self.yahoo_base_url = base_url.to_string();
        self.fear_greed_base_url = base_url.to_string();
        self
    }
}

/// The full set of provider clients sharing one [`Upstream`].
pub struct MarketDataClients {
    pub polygon: PolygonClient,
    /// Present only when an index-plan key is configured.
    pub polygon_index: Option<PolygonClient>,
    pub fred: FredClient,
    pub bls: BlsClient,
    pub eia: EiaClient,
    pub yahoo: YahooClient,
    pub fear_greed: FearGreedClient,
}

impl MarketDataClients {
    pub fn new(settings: &ProviderSettings, upstream: Arc<Upstream>) -> Self {
        let polygon_index = settings
            .polygon_index_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(|key| {
                PolygonClient::new(
                    polygon::INDEX_PROVIDER_ID,
                    &settings.polygon_base_url,
                    key,
                    upstream.clone(),
                )
            });

        Self {
            polygon: PolygonClient::new(
                polygon::STOCKS_PROVIDER_ID,
                &settings.polygon_base_url,
                &settings.polygon_stocks_key,
                upstream.clone(),
            ),
            polygon_index,
            fred: FredClient::new(
                &settings.fred_base_url,
                settings.fred_api_key.clone(),
                upstream.clone(),
            ),
            bls: BlsClient::new(
                &settings.bls_base_url,
                settings.bls_api_key.clone(),
                upstream.clone(),
            ),
            eia: EiaClient::new(
                &settings.eia_base_url,
                settings.eia_api_key.clone(),
                upstream.clone(),
            ),
            yahoo: YahooClient::new(&settings.yahoo_base_url, upstream.clone()),
            fear_greed: FearGreedClient::new(
                &settings.fear_greed_base_url,
                settings.rapidapi_key.as_deref(),
                upstream,
            ),
        }
    }
}
