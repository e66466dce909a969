use std::sync::Arc;

use crate::config::Config;
use finmate_core::{
    dividends::{DividendService, DividendServiceTrait},
    macro_data::{MacroService, MacroServiceTrait},
    market::{MarketService, MarketServiceTrait},
    news::{NewsService, NewsServiceTrait},
    portfolio::{JsonPortfolioStore, PortfolioRepositoryTrait, PortfolioService, PortfolioServiceTrait},
};
use finmate_market_data::{ConcurrencyLimiter, MarketDataClients, RetryPolicy, TtlCache, Upstream};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub portfolio_service: Arc<dyn PortfolioServiceTrait + Send + Sync>,
    pub dividend_service: Arc<dyn DividendServiceTrait + Send + Sync>,
    pub news_service: Arc<dyn NewsServiceTrait + Send + Sync>,
    pub market_service: Arc<dyn MarketServiceTrait + Send + Sync>,
    pub macro_service: Arc<dyn MacroServiceTrait + Send + Sync>,
}

pub fn init_tracing() {
    let log_format = std::env::var("FINMATE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let upstream = Arc::new(Upstream::new(
        TtlCache::new(),
        ConcurrencyLimiter::new(config.upstream_concurrency),
        RetryPolicy::new(config.retry_attempts, config.retry_base_delay),
    ));
    let clients = Arc::new(MarketDataClients::new(&config.providers, upstream));
    if clients.polygon_index.is_none() {
        tracing::info!("POLY_INDEX_KEY not set; VIX falls back to the stocks key");
    }

    let store: Arc<dyn PortfolioRepositoryTrait> =
        Arc::new(JsonPortfolioStore::open(&config.portfolio_path)?);
    tracing::info!("Portfolio file: {}", config.portfolio_path.display());

    let dividend_service: Arc<dyn DividendServiceTrait + Send + Sync> =
        Arc::new(DividendService::new(clients.clone(), store.clone()));
    let portfolio_service = Arc::new(PortfolioService::new(
        store.clone(),
        clients.clone(),
        dividend_service.clone(),
    ));
    let news_service = Arc::new(NewsService::new(clients.clone(), store));
    let market_service = Arc::new(MarketService::new(clients.clone(), dividend_service.clone()));
    let macro_service = Arc::new(MacroService::new(clients));

    Ok(Arc::new(AppState {
        portfolio_service,
        dividend_service,
        news_service,
        market_service,
        macro_service,
    }))
}
