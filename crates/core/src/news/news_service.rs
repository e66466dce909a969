use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use finmate_market_data::{MarketDataClients, NewsArticle};
use futures::future::join_all;
use log::{info, warn};

use crate::errors::{Result, ValidationError};
use crate::news::news_model::{build_page, NewsPage, NewsPaging};
use crate::news::news_traits::NewsServiceTrait;
use crate::portfolio::{portfolio_tickers, PortfolioRepositoryTrait};

/// Tickers accepted by an ad-hoc feed request.
pub const MAX_TICKERS: usize = 20;
/// Portfolio tickers fetched concurrently per round.
pub const PORTFOLIO_CHUNK_SIZE: usize = 20;
pub const PORTFOLIO_PER_TICKER_CAP: u32 = 50;

pub struct NewsService {
    clients: Arc<MarketDataClients>,
    store: Arc<dyn PortfolioRepositoryTrait>,
}

impl NewsService {
    pub fn new(clients: Arc<MarketDataClients>, store: Arc<dyn PortfolioRepositoryTrait>) -> Self {
        Self { clients, store }
    }

    /// Fetch every ticker concurrently; a failed ticker contributes nothing.
    async fn fetch_all(&self, tickers: &[String], cap: u32) -> Vec<(String, NewsArticle)> {
        let fetches = tickers.iter().map(|ticker| async move {
            match self.clients.polygon.news(ticker, cap).await {
                Ok(articles) => articles
                    .into_iter()
                    .map(|a| (ticker.clone(), a))
                    .collect::<Vec<_>>(),
                Err(e) => {
                    warn!("News fetch failed for {}: {}", ticker, e);
                    Vec::new()
                }
            }
        });
        join_all(fetches).await.into_iter().flatten().collect()
    }
}

#[async_trait]
impl NewsServiceTrait for NewsService {
    async fn ticker_news(&self, tickers: &[String], paging: NewsPaging) -> Result<NewsPage> {
        let tickers: Vec<String> = tickers
            .iter()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .take(MAX_TICKERS)
            .collect();
        if tickers.is_empty() {
            return Err(ValidationError::MissingField("tickers".to_string()).into());
        }

        let fetched = self.fetch_all(&tickers, paging.per_ticker_cap()).await;
        Ok(build_page(fetched, Utc::now(), paging))
    }

    async fn portfolio_news(&self, paging: NewsPaging) -> Result<NewsPage> {
        let tickers = portfolio_tickers(&self.store.list().await?);
        if tickers.is_empty() {
            return Err(
                ValidationError::InvalidInput("No tickers in portfolio".to_string()).into(),
            );
        }

        let mut fetched = Vec::new();
        for chunk in tickers.chunks(PORTFOLIO_CHUNK_SIZE) {
            fetched.extend(self.fetch_all(chunk, PORTFOLIO_PER_TICKER_CAP).await);
        }

        let mut page = build_page(fetched, Utc::now(), paging);
        info!(
            "Portfolio news: {} articles for {} tickers",
            page.total,
            tickers.len()
        );
        page.tickers = Some(tickers);
        Ok(page)
    }
}
