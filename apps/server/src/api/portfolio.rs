use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post, put},
    Json, Router,
};
use finmate_core::portfolio::{NewPosition, PortfolioView, Position, PositionPatch};
use serde::Serialize;

#[derive(Serialize)]
struct Added {
    ok: bool,
    added: Position,
}

#[derive(Serialize)]
struct Updated {
    ok: bool,
    updated: Position,
}

#[derive(Serialize)]
struct Removed {
    ok: bool,
    removed: Position,
}

async fn get_portfolio(State(state): State<Arc<AppState>>) -> ApiResult<Json<PortfolioView>> {
    let view = state.portfolio_service.get_portfolio().await?;
    Ok(Json(view))
}

async fn add_position(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewPosition>, JsonRejection>,
) -> ApiResult<Json<Added>> {
    let Json(payload) = payload?;
    let added = state.portfolio_service.add_position(payload).await?;
    tracing::info!("Added position {}", added.id);
    Ok(Json(Added { ok: true, added }))
}

async fn update_position(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    patch: Result<Json<PositionPatch>, JsonRejection>,
) -> ApiResult<Json<Updated>> {
    let Json(patch) = patch?;
    let updated = state.portfolio_service.update_position(&id, patch).await?;
    Ok(Json(Updated { ok: true, updated }))
}

async fn delete_position(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Removed>> {
    let removed = state.portfolio_service.delete_position(&id).await?;
    tracing::info!("Removed position {}", removed.id);
    Ok(Json(Removed { ok: true, removed }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio", get(get_portfolio))
        .route("/portfolio/add", post(add_position))
        .route(
            "/portfolio/{id}",
            put(update_position)
                .patch(update_position)
                .delete(delete_position),
        )
}
