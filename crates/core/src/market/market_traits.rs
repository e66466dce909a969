use crate::errors::Result;
use crate::market::market_model::{Commodities, MarketCycles, MarketDashboard, Sectors};
use async_trait::async_trait;

/// Trait for market overview operations
///
/// Per-ticker and per-series failures are reported inside the response
/// rather than failing the whole call.
#[async_trait]
pub trait MarketServiceTrait: Send + Sync {
    async fn dashboard(&self, tickers: &[String]) -> MarketDashboard;
    /// Price change over 1, 30 and 90 days. Fails when `tickers` is empty.
    async fn cycles(&self, tickers: &[String]) -> Result<MarketCycles>;
    async fn sectors(&self) -> Sectors;
    async fn commodities(&self) -> Commodities;
}
