use std::sync::Arc;

use crate::main_lib::AppState;
use axum::{extract::State, routing::get, Json, Router};
use finmate_core::macro_data::MacroSnapshot;

async fn summary(State(state): State<Arc<AppState>>) -> Json<MacroSnapshot> {
    Json(state.macro_service.summary().await)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/macro/summary", get(summary))
}
