use std::sync::Arc;

use async_trait::async_trait;
use finmate_market_data::MarketDataClients;
use futures::future::join_all;
use log::{debug, warn};
use rust_decimal::prelude::*;

use crate::dividends::DividendServiceTrait;
use crate::errors::Result;
use crate::portfolio::portfolio_model::{
    EnrichedPosition, NewPosition, PortfolioTotals, PortfolioView, Position, PositionPatch,
};
use crate::portfolio::portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
use crate::resolver::TickerResolver;

pub struct PortfolioService {
    store: Arc<dyn PortfolioRepositoryTrait>,
    clients: Arc<MarketDataClients>,
    resolver: TickerResolver,
    dividends: Arc<dyn DividendServiceTrait>,
}

impl PortfolioService {
    pub fn new(
        store: Arc<dyn PortfolioRepositoryTrait>,
        clients: Arc<MarketDataClients>,
        dividends: Arc<dyn DividendServiceTrait>,
    ) -> Self {
        Self {
            store,
            resolver: TickerResolver::new(clients.clone()),
            clients,
            dividends,
        }
    }

    /// Stored ticker first, then ISIN lookup, then name lookup.
    async fn resolve_ticker(&self, position: &Position) -> Option<String> {
        if !position.ticker.is_empty() {
            return Some(position.ticker.to_uppercase());
        }
        if !position.isin.is_empty() {
            if let Some(ticker) = self.resolver.resolve(&position.isin).await {
                return Some(ticker);
            }
        }
        if !position.name.is_empty() {
            return self.resolver.resolve(&position.name).await;
        }
        None
    }

    async fn enrich(&self, position: Position) -> EnrichedPosition {
        let Some(ticker) = self.resolve_ticker(&position).await else {
            debug!("No ticker for position {}", position.id);
            return EnrichedPosition::unresolved(position);
        };

        let (quote, dividends) = futures::join!(
            self.clients.polygon.previous_close(&ticker),
            self.dividends.ttm(&ticker)
        );
        let price = match quote {
            Ok(q) => Decimal::from_f64(q.close),
            Err(e) => {
                warn!("Quote failed for {}: {}", ticker, e);
                None
            }
        };

        EnrichedPosition::compute(position, ticker, price, dividends)
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn get_portfolio(&self) -> Result<PortfolioView> {
        let positions = self.store.list().await?;
        let portfolio = join_all(positions.into_iter().map(|p| self.enrich(p))).await;
        let totals = PortfolioTotals::from_positions(&portfolio);
        Ok(PortfolioView { portfolio, totals })
    }

    async fn add_position(&self, new_position: NewPosition) -> Result<Position> {
        let position = new_position.into_position()?;
        self.store.add(position).await
    }

    async fn update_position(&self, id: &str, patch: PositionPatch) -> Result<Position> {
        self.store.update(id, patch).await
    }

    async fn delete_position(&self, id: &str) -> Result<Position> {
        self.store.delete(id).await
    }
}
