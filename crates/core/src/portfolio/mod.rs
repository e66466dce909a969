//! Portfolio module - positions, the JSON file store and enrichment with
//! prices and dividend income.

mod portfolio_model;
mod portfolio_service;
mod portfolio_store;
mod portfolio_traits;

pub use portfolio_model::{
    portfolio_tickers, EnrichedPosition, NewPosition, PortfolioTotals, PortfolioView, Position,
    PositionPatch,
};
pub use portfolio_service::PortfolioService;
pub use portfolio_store::JsonPortfolioStore;
pub use portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
