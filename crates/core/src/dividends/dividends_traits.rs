use crate::dividends::dividends_model::{CalendarEntry, DividendTtm};
use crate::errors::Result;
use async_trait::async_trait;
use finmate_market_data::DividendEvent;

/// Trait for dividend service operations
#[async_trait]
pub trait DividendServiceTrait: Send + Sync {
    /// Trailing-twelve-month summary. Never fails; upstream errors yield zero.
    async fn ttm(&self, ticker: &str) -> DividendTtm;
    /// Raw declarations for one ticker, newest first.
    async fn list(&self, ticker: &str) -> Result<Vec<DividendEvent>>;
    /// Upcoming ex-dates across the portfolio, soonest first.
    async fn calendar(&self) -> Result<Vec<CalendarEntry>>;
}
