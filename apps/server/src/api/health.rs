use std::sync::Arc;

use crate::main_lib::AppState;
use axum::{routing::get, Router};

async fn healthz() -> &'static str {
    "ok"
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/healthz", get(healthz))
}
