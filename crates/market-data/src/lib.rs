//! FinMate Market Data Crate
//!
//! Clients for the upstream data providers behind FinMate, plus the
//! plumbing every upstream call shares.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  Provider client |  (Polygon, FRED, BLS, EIA, Yahoo, Fear & Greed)
//! +------------------+
//!          |
//!          v
//! +------------------+     hit
//! |     TtlCache     | ----------> cached JSON
//! +------------------+
//!          | miss
//!          v
//! +------------------+
//! |ConcurrencyLimiter|  (bounded, FIFO)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |    with_retry    |  (exponential backoff, classified errors)
//! +------------------+
//!          |
//!          v
//!       reqwest
//! ```

pub mod backoff;
pub mod cache;
pub mod errors;
pub mod limiter;
pub mod provider;
pub mod upstream;

pub use backoff::{with_retry, RetryPolicy};
pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use errors::{Classify, MarketDataError, RetryClass};
pub use limiter::ConcurrencyLimiter;
pub use upstream::{ttl, Upstream, UpstreamRequest};

pub use provider::bls::{BlsClient, DataPoint, CPI_SERIES};
pub use provider::eia::{EiaClient, Observation as EiaObservation};
pub use provider::fear_greed::{FearGreed, FearGreedClient};
pub use provider::fred::{FredClient, Observation as FredObservation};
pub use provider::polygon::{DividendEvent, NewsArticle, PolygonClient, PrevClose};
pub use provider::yahoo::{ChartQuote, YahooClient};
pub use provider::{MarketDataClients, ProviderSettings};
