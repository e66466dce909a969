//! FinMate Core - aggregation services and the portfolio store.
//!
//! Each module pairs a model file, a service trait and a concrete service
//! built on the provider clients from `finmate-market-data`. The HTTP
//! layer only ever sees the traits.

pub mod dividends;
pub mod errors;
pub mod macro_data;
pub mod market;
pub mod news;
pub mod portfolio;
pub mod resolver;
pub mod utils;

pub use errors::Error;
pub use errors::Result;
