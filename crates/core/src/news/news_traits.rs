use crate::errors::Result;
use crate::news::news_model::{NewsPage, NewsPaging};
use async_trait::async_trait;

/// Trait for news feed operations
#[async_trait]
pub trait NewsServiceTrait: Send + Sync {
    /// Feed for explicit tickers; at most the first 20 are used.
    async fn ticker_news(&self, tickers: &[String], paging: NewsPaging) -> Result<NewsPage>;
    /// Feed for every ticker held in the portfolio.
    async fn portfolio_news(&self, paging: NewsPaging) -> Result<NewsPage>;
}
