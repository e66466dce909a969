use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use finmate_market_data::ProviderSettings;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub portfolio_path: PathBuf,
    pub static_dir: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub rate_limit_per_minute: u32,
    /// Key the rate limiter on `X-Forwarded-For` instead of the peer address.
    pub trust_forwarded: bool,
    pub upstream_concurrency: usize,
    pub retry_attempts: u32,
    pub retry_base_delay: Duration,
    pub providers: ProviderSettings,
}

fn var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = var("FINMATE_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3001".to_string())
            .parse()
            .context("Invalid FINMATE_LISTEN_ADDR")?;
        let portfolio_path = PathBuf::from(
            var("FINMATE_PORTFOLIO_PATH").unwrap_or_else(|| "./portfolio.json".into()),
        );
        let static_dir = var("FINMATE_STATIC_DIR").unwrap_or_else(|| "public".into());
        let cors_allow = var("FINMATE_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parsed("FINMATE_REQUEST_TIMEOUT_MS", 60_000);
        let retry_base_ms: u64 = parsed("FINMATE_RETRY_BASE_MS", 300);

        let polygon_stocks_key = var("POLY_STOCKS_KEY").context("POLY_STOCKS_KEY must be set")?;
        let mut providers = ProviderSettings::new(polygon_stocks_key);
        providers.polygon_index_key = var("POLY_INDEX_KEY");
        providers.fred_api_key = var("FRED_API_KEY");
        providers.bls_api_key = var("BLS_API_KEY");
        providers.eia_api_key = var("EIA_API_KEY");
        providers.rapidapi_key = var("RAPIDAPI_KEY");
        for (key, target) in [
            ("FINMATE_POLYGON_BASE_URL", &mut providers.polygon_base_url),
            ("FINMATE_FRED_BASE_URL", &mut providers.fred_base_url),
            ("FINMATE_BLS_BASE_URL", &mut providers.bls_base_url),
            ("FINMATE_EIA_BASE_URL", &mut providers.eia_base_url),
            ("FINMATE_YAHOO_BASE_URL", &mut providers.yahoo_base_url),
            ("FINMATE_FEAR_GREED_BASE_URL", &mut providers.fear_greed_base_url),
        ] {
            if let Some(url) = var(key) {
                *target = url;
            }
        }

        Ok(Self {
            listen_addr,
            portfolio_path,
            static_dir,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            rate_limit_per_minute: parsed("FINMATE_RATE_LIMIT_PER_MINUTE", 60),
            trust_forwarded: parsed("FINMATE_TRUST_FORWARDED", false),
            upstream_concurrency: parsed("FINMATE_UPSTREAM_CONCURRENCY", 4),
            retry_attempts: parsed("FINMATE_RETRY_ATTEMPTS", 3),
            retry_base_delay: Duration::from_millis(retry_base_ms),
            providers,
        })
    }
}
