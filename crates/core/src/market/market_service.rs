use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use finmate_market_data::MarketDataClients;
use futures::future::join_all;
use log::warn;
use rust_decimal::prelude::ToPrimitive;

use crate::dividends::DividendServiceTrait;
use crate::errors::{Result, ValidationError};
use crate::macro_data::fetch_treasury;
use crate::market::market_model::{
    five_year_average, vs_five_year_pct, CommodityPrice, Commodities, CycleEntry, Inventory,
    MarketCycles, MarketDashboard, SectorEntry, Sectors, TickerQuote, EIA_SERIES, SECTORS,
};
use crate::market::market_traits::MarketServiceTrait;
use crate::utils::{pct_change, round_f64, today};

const NO_DATA: &str = "no_data";
const PRICE_SOURCE: &str = "polygon";

const COAL_SERIES: &str = "PCOALAUUSDM";
const WTI_SERIES: &str = "DCOILWTICO";
const BRENT_SERIES: &str = "DCOILBRENTEU";
const HENRY_HUB_SERIES: &str = "DHHNGSP";
const URANIUM_PROXY: &str = "URA";

/// Look-back windows for price cycles, in days.
const CYCLE_DAYS: [i64; 3] = [1, 30, 90];

pub struct MarketService {
    clients: Arc<MarketDataClients>,
    dividends: Arc<dyn DividendServiceTrait>,
}

impl MarketService {
    pub fn new(clients: Arc<MarketDataClients>, dividends: Arc<dyn DividendServiceTrait>) -> Self {
        Self { clients, dividends }
    }

    async fn quote(&self, ticker: &str) -> TickerQuote {
        match self.clients.polygon.previous_close(ticker).await {
            Ok(q) => TickerQuote::Price {
                price: q.close,
                source: PRICE_SOURCE,
            },
            Err(e) => {
                warn!("Quote failed for {}: {}", ticker, e);
                TickerQuote::Error {
                    error: NO_DATA.to_string(),
                }
            }
        }
    }

    async fn inventory(&self, series: &str, unit: &'static str) -> Inventory {
        let eia = &self.clients.eia;
        let (latest, history) = futures::join!(eia.latest(series), eia.history(series));

        let latest = match latest {
            Ok(latest) => latest,
            Err(e) => {
                warn!("EIA series {} unavailable: {}", series, e);
                return Inventory {
                    value: None,
                    unit,
                    vs5y_pct: None,
                };
            }
        };

        let vs5y_pct = match history {
            Ok(history) => five_year_average(&history, latest.period)
                .and_then(|avg| vs_five_year_pct(latest.value, avg)),
            Err(e) => {
                warn!("EIA history {} unavailable: {}", series, e);
                None
            }
        };

        Inventory {
            value: Some(latest.value),
            unit,
            vs5y_pct,
        }
    }

    async fn close_on(&self, ticker: &str, date: NaiveDate) -> Option<f64> {
        match self.clients.polygon.daily_close(ticker, date).await {
            Ok(close) => close,
            Err(e) => {
                warn!("No close for {} on {}: {}", ticker, date, e);
                None
            }
        }
    }

    async fn cycle(&self, ticker: &str, today: NaiveDate) -> CycleEntry {
        let price = match self.clients.polygon.previous_close(ticker).await {
            Ok(q) => q.close,
            Err(e) => {
                warn!("Cycle quote failed for {}: {}", ticker, e);
                return CycleEntry::Error {
                    ticker: ticker.to_string(),
                    error: NO_DATA.to_string(),
                };
            }
        };

        let [d1, d30, d90] = CYCLE_DAYS.map(|days| today - Duration::days(days));
        let (c1, c30, c90) = futures::join!(
            self.close_on(ticker, d1),
            self.close_on(ticker, d30),
            self.close_on(ticker, d90),
        );
        let change = |close: Option<f64>| close.and_then(|c| pct_change(price, c));

        CycleEntry::Change {
            ticker: ticker.to_string(),
            price,
            d1: change(c1),
            d30: change(c30),
            d90: change(c90),
        }
    }

    async fn sector(&self, ticker: &str, sector: &'static str) -> SectorEntry {
        let (quote, ttm) = futures::join!(
            self.clients.polygon.previous_close(ticker),
            self.dividends.ttm(ticker)
        );
        match quote {
            Ok(q) => {
                let dps = ttm.dps_ttm.to_f64().unwrap_or(0.0);
                let yield_pct = if dps > 0.0 && q.close > 0.0 {
                    Some(round_f64(dps / q.close * 100.0, 2))
                } else {
                    None
                };
                SectorEntry::Yield {
                    sector,
                    price: q.close,
                    yield_pct,
                    samples: ttm.samples,
                }
            }
            Err(e) => {
                warn!("Sector quote failed for {}: {}", ticker, e);
                SectorEntry::Error {
                    sector,
                    error: NO_DATA.to_string(),
                }
            }
        }
    }

    async fn fred_price(&self, series: &str, unit: &'static str) -> Option<CommodityPrice> {
        match self.clients.fred.latest(series).await {
            Ok(o) => Some(CommodityPrice {
                date: o.date,
                value: o.value,
                unit,
            }),
            Err(e) => {
                warn!("Commodity series {} unavailable: {}", series, e);
                None
            }
        }
    }

    async fn uranium(&self) -> Option<CommodityPrice> {
        match self.clients.polygon.previous_close(URANIUM_PROXY).await {
            Ok(q) if q.close > 0.0 => Some(CommodityPrice {
                date: today(),
                value: q.close,
                unit: "USD (URA ETF)",
            }),
            Ok(_) => None,
            Err(e) => {
                warn!("Uranium proxy unavailable: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl MarketServiceTrait for MarketService {
    async fn dashboard(&self, tickers: &[String]) -> MarketDashboard {
        let quotes = join_all(
            tickers
                .iter()
                .map(|t| async move { (t.clone(), self.quote(t).await) }),
        );
        let inventories = join_all(EIA_SERIES.iter().map(|&(key, series, unit)| async move {
            (key.to_string(), self.inventory(series, unit).await)
        }));

        let (quotes, treasury, inventories) =
            futures::join!(quotes, fetch_treasury(&self.clients.fred), inventories);

        MarketDashboard {
            tickers: quotes.into_iter().collect(),
            treasury,
            inventories: inventories.into_iter().collect(),
        }
    }

    async fn cycles(&self, tickers: &[String]) -> Result<MarketCycles> {
        if tickers.is_empty() {
            return Err(ValidationError::MissingField("tickers".to_string()).into());
        }
        let today = today();
        let entries = join_all(
            tickers
                .iter()
                .map(|t| async move { (t.clone(), self.cycle(t, today).await) }),
        )
        .await;

        Ok(MarketCycles {
            data: entries.into_iter().collect(),
        })
    }

    async fn sectors(&self) -> Sectors {
        let entries = join_all(SECTORS.iter().map(|&(ticker, sector)| async move {
            (ticker.to_string(), self.sector(ticker, sector).await)
        }))
        .await;

        Sectors {
            sectors: entries.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }

    async fn commodities(&self) -> Commodities {
        let (coal, wti, brent, henry_hub, uranium) = futures::join!(
            self.fred_price(COAL_SERIES, "USD/mt"),
            self.fred_price(WTI_SERIES, "USD/bbl"),
            self.fred_price(BRENT_SERIES, "USD/bbl"),
            self.fred_price(HENRY_HUB_SERIES, "USD/MMBtu"),
            self.uranium(),
        );
        Commodities {
            coal,
            wti,
            brent,
            henry_hub,
            uranium,
        }
    }
}
