use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use finmate_core::news::{NewsPage, NewsPaging};
use finmate_core::utils::parse_tickers;
use serde::Deserialize;

#[derive(Deserialize)]
struct NewsQuery {
    tickers: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

impl NewsQuery {
    fn paging(&self) -> NewsPaging {
        NewsPaging::from_query(self.limit.as_deref(), self.offset.as_deref())
    }
}

async fn ticker_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> ApiResult<Json<NewsPage>> {
    let tickers = parse_tickers(query.tickers.as_deref().unwrap_or_default());
    let page = state
        .news_service
        .ticker_news(&tickers, query.paging())
        .await?;
    Ok(Json(page))
}

async fn portfolio_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> ApiResult<Json<NewsPage>> {
    let page = state.news_service.portfolio_news(query.paging()).await?;
    Ok(Json(page))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/news", get(ticker_news))
        .route("/news/portfolio", get(portfolio_news))
}
