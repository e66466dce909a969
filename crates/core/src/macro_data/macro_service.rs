use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use finmate_market_data::{FredClient, MarketDataClients, PrevClose, CPI_SERIES};
use log::warn;

use crate::macro_data::macro_model::{
    cpi_yoy, m2_yoy, summary_text, treasury_from, Cpi, MacroSnapshot, MoneySupply, Treasury, Vix,
    VixSource,
};
use crate::macro_data::macro_traits::MacroServiceTrait;

pub const TREASURY_2Y: &str = "DGS2";
pub const TREASURY_10Y: &str = "DGS10";
pub const M2_SERIES: &str = "M2SL";

const VIX_POLYGON: &str = "I:VIX";
const VIX_YAHOO: &str = "^VIX";

/// Latest 2Y/10Y yields; `None` unless both are available.
pub async fn fetch_treasury(fred: &FredClient) -> Option<Treasury> {
    let (y2, y10) = futures::join!(fred.latest(TREASURY_2Y), fred.latest(TREASURY_10Y));
    match (y2, y10) {
        (Ok(y2), Ok(y10)) => Some(treasury_from(y2, y10)),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Treasury yields unavailable: {}", e);
            None
        }
    }
}

pub struct MacroService {
    clients: Arc<MarketDataClients>,
}

impl MacroService {
    pub fn new(clients: Arc<MarketDataClients>) -> Self {
        Self { clients }
    }

    async fn cpi(&self) -> Option<Cpi> {
        match self.clients.bls.series(CPI_SERIES).await {
            Ok(points) => cpi_yoy(&points),
            Err(e) => {
                warn!("CPI unavailable: {}", e);
                None
            }
        }
    }

    async fn m2(&self) -> Option<MoneySupply> {
        match self.clients.fred.observations(M2_SERIES, Some("m")).await {
            Ok(observations) => m2_yoy(&observations),
            Err(e) => {
                warn!("M2 unavailable: {}", e);
                None
            }
        }
    }

    /// Index-plan key first, then the stocks key, then Yahoo.
    async fn vix(&self) -> Vix {
        fn from_polygon(q: PrevClose, source: VixSource) -> Vix {
            Vix {
                value: Some(q.close),
                ts: Some(q.timestamp.unwrap_or_else(|| Utc::now().timestamp_millis())),
                source,
            }
        }

        if let Some(index) = &self.clients.polygon_index {
            match index.previous_close(VIX_POLYGON).await {
                Ok(q) => return from_polygon(q, VixSource::PolygonIndex),
                Err(e) => warn!("VIX via Polygon index key failed: {}", e),
            }
        }

        match self.clients.polygon.previous_close(VIX_POLYGON).await {
            Ok(q) => return from_polygon(q, VixSource::PolygonStocks),
            Err(e) => warn!("VIX via Polygon stocks key failed: {}", e),
        }

        match self.clients.yahoo.chart_quote(VIX_YAHOO).await {
            Ok(q) => Vix {
                value: Some(q.price),
                ts: Some(q.timestamp.unwrap_or_else(|| Utc::now().timestamp_millis())),
                source: VixSource::Yahoo,
            },
            Err(e) => {
                warn!("VIX via Yahoo failed: {}", e);
                Vix::unavailable()
            }
        }
    }
}

#[async_trait]
impl MacroServiceTrait for MacroService {
    async fn summary(&self) -> MacroSnapshot {
        let (treasury, cpi, m2, vix, fear_greed) = futures::join!(
            fetch_treasury(&self.clients.fred),
            self.cpi(),
            self.m2(),
            self.vix(),
            self.clients.fear_greed.current(),
        );
        let fear_greed = fear_greed
            .map_err(|e| warn!("Fear & Greed unavailable: {}", e))
            .ok();

        MacroSnapshot {
            summary: summary_text(
                treasury.as_ref(),
                cpi.as_ref(),
                m2.as_ref(),
                &vix,
                fear_greed.as_ref(),
            ),
            treasury,
            cpi,
            m2,
            vix,
            fear_greed,
        }
    }
}
