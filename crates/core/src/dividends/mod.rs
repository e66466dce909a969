//! Dividends module - trailing-twelve-month income, raw declarations and
//! the upcoming ex-date calendar.

mod dividends_model;
mod dividends_service;
mod dividends_traits;

pub use dividends_model::{
    summarize_ttm, upcoming_entries, CalendarEntry, DividendPoint, DividendTtm,
    CALENDAR_FETCH_LIMIT, LIST_LIMIT, TTM_FETCH_DAYS, TTM_FETCH_LIMIT, TTM_WINDOW_DAYS,
};
pub use dividends_service::DividendService;
pub use dividends_traits::DividendServiceTrait;
