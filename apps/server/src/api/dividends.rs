use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use finmate_core::dividends::CalendarEntry;
use finmate_market_data::DividendEvent;
use serde::Serialize;

#[derive(Serialize)]
struct DividendList {
    ticker: String,
    results: Vec<DividendEvent>,
}

#[derive(Serialize)]
struct Calendar {
    items: Vec<CalendarEntry>,
}

async fn list_dividends(
    Path(ticker): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DividendList>> {
    let ticker = ticker.trim().to_uppercase();
    let results = state.dividend_service.list(&ticker).await?;
    Ok(Json(DividendList { ticker, results }))
}

async fn calendar(State(state): State<Arc<AppState>>) -> ApiResult<Json<Calendar>> {
    let items = state.dividend_service.calendar().await?;
    Ok(Json(Calendar { items }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dividends/{ticker}", get(list_dividends))
        .route("/dividend-calendar", get(calendar))
}
