use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use finmate_core::market::{Commodities, MarketCycles, MarketDashboard, Sectors};
use finmate_core::utils::parse_tickers;
use serde::Deserialize;

#[derive(Deserialize)]
struct TickersQuery {
    tickers: Option<String>,
}

impl TickersQuery {
    fn tickers(&self) -> Vec<String> {
        parse_tickers(self.tickers.as_deref().unwrap_or_default())
    }
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TickersQuery>,
) -> Json<MarketDashboard> {
    Json(state.market_service.dashboard(&query.tickers()).await)
}

async fn cycles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TickersQuery>,
) -> ApiResult<Json<MarketCycles>> {
    let cycles = state.market_service.cycles(&query.tickers()).await?;
    Ok(Json(cycles))
}

async fn sectors(State(state): State<Arc<AppState>>) -> Json<Sectors> {
    Json(state.market_service.sectors().await)
}

async fn commodities(State(state): State<Arc<AppState>>) -> Json<Commodities> {
    Json(state.market_service.commodities().await)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/market-dashboard", get(dashboard))
        .route("/market-cycles", get(cycles))
        .route("/sectors", get(sectors))
        .route("/commodities", get(commodities))
}
