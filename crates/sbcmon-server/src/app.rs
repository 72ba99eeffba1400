use crate::state::AppState;
use crate::{api, logging};
use axum::middleware;
use axum::routing::get;
use axum::Router;

pub fn build_http_app(state: AppState) -> Router {
    let metrics_path = state.config.metrics_path.clone();

    Router::new()
        .route("/", get(api::index))
        .route(&metrics_path, get(api::metrics))
        .route("/health", get(api::health))
        .with_state(state)
        .layer(middleware::from_fn(logging::request_logging))
}
