//! Ticker resolution for positions identified by ISIN or name.

mod ticker_resolver;

pub use ticker_resolver::{is_isin, is_plain_ticker, TickerResolver};
