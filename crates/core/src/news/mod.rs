//! News module - per-ticker Polygon news merged into one paginated feed.

mod news_model;
mod news_service;
mod news_traits;

pub use news_model::{build_page, categorize, NewsCategory, NewsItem, NewsPage, NewsPaging};
pub use news_service::{NewsService, MAX_TICKERS, PORTFOLIO_CHUNK_SIZE, PORTFOLIO_PER_TICKER_CAP};
pub use news_traits::NewsServiceTrait;
