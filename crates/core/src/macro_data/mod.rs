//! Macro module - treasury curve, inflation, money supply, volatility and
//! sentiment, with a plain-text summary.

mod macro_model;
mod macro_service;
mod macro_traits;

pub use macro_model::{
    cpi_yoy, m2_yoy, summary_text, treasury_from, Cpi, MacroSnapshot, MoneySupply, Treasury, Vix,
    VixSource,
};
pub use macro_service::{fetch_treasury, MacroService, M2_SERIES, TREASURY_10Y, TREASURY_2Y};
pub use macro_traits::MacroServiceTrait;
