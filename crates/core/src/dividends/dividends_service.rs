use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use finmate_market_data::{ttl, DividendEvent, MarketDataClients};
use futures::future::join_all;
use log::warn;

use crate::dividends::dividends_model::{
    summarize_ttm, upcoming_entries, CalendarEntry, DividendTtm, CALENDAR_FETCH_LIMIT,
    LIST_LIMIT, TTM_FETCH_DAYS, TTM_FETCH_LIMIT,
};
use crate::dividends::dividends_traits::DividendServiceTrait;
use crate::errors::Result;
use crate::portfolio::{portfolio_tickers, PortfolioRepositoryTrait};
use crate::utils::today;

pub struct DividendService {
    clients: Arc<MarketDataClients>,
    store: Arc<dyn PortfolioRepositoryTrait>,
}

impl DividendService {
    pub fn new(clients: Arc<MarketDataClients>, store: Arc<dyn PortfolioRepositoryTrait>) -> Self {
        Self { clients, store }
    }
}

#[async_trait]
impl DividendServiceTrait for DividendService {
    async fn ttm(&self, ticker: &str) -> DividendTtm {
        let today = today();
        let window = (today - Duration::days(TTM_FETCH_DAYS), today);
        match self
            .clients
            .polygon
            .dividends(ticker, TTM_FETCH_LIMIT, Some(window), ttl::REFERENCE)
            .await
        {
            Ok(events) => summarize_ttm(&events, today),
            Err(e) => {
                warn!("Dividend TTM failed for {}: {}", ticker, e);
                DividendTtm::default()
            }
        }
    }

    async fn list(&self, ticker: &str) -> Result<Vec<DividendEvent>> {
        let events = self
            .clients
            .polygon
            .dividends(ticker, LIST_LIMIT, None, ttl::NEWS)
            .await?;
        Ok(events)
    }

    async fn calendar(&self) -> Result<Vec<CalendarEntry>> {
        let tickers = portfolio_tickers(&self.store.list().await?);
        let today = today();

        let fetches = tickers.iter().map(|ticker| async move {
            match self
                .clients
                .polygon
                .dividends(ticker, CALENDAR_FETCH_LIMIT, None, ttl::NEWS)
                .await
            {
                Ok(events) => upcoming_entries(ticker, &events, today),
                Err(e) => {
                    warn!("Dividend calendar fetch failed for {}: {}", ticker, e);
                    Vec::new()
                }
            }
        });

        let mut entries: Vec<CalendarEntry> = join_all(fetches).await.into_iter().flatten().collect();
        entries.sort_by(|a, b| a.ex_date.cmp(&b.ex_date));
        Ok(entries)
    }
}
