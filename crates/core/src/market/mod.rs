//! Market module - the dashboard, price cycles, sector yields and
//! commodity prices.

mod market_model;
mod market_service;
mod market_traits;

pub use market_model::{
    five_year_average, vs_five_year_pct, CommodityPrice, Commodities, CycleEntry, Inventory,
    MarketCycles, MarketDashboard, SectorEntry, Sectors, TickerQuote, EIA_SERIES, SECTORS,
};
pub use market_service::MarketService;
pub use market_traits::MarketServiceTrait;
