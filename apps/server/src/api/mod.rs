use std::sync::Arc;

use axum::{http::HeaderValue, middleware, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    main_lib::AppState,
    rate_limit::{rate_limit, IpRateLimiter},
};

mod dividends;
mod health;
mod macro_data;
mod market;
mod news;
mod portfolio;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {}", o);
                    None
                }
            })
            .collect::<Vec<HeaderValue>>();
        CorsLayer::new().allow_origin(origins)
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let limiter = Arc::new(
        IpRateLimiter::new(config.rate_limit_per_minute).trust_forwarded(config.trust_forwarded),
    );

    let api = Router::new()
        .merge(health::router())
        .merge(portfolio::router())
        .merge(news::router())
        .merge(market::router())
        .merge(macro_data::router())
        .merge(dividends::router())
        .layer(middleware::from_fn_with_state(limiter, rate_limit));

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.request_timeout))
        .with_state(state)
}
