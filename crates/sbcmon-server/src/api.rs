use crate::logging::TraceId;
use crate::render;
use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// Landing page pointing at the scrape endpoint.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let path = &state.config.metrics_path;
    Html(format!(
        "<html>\n\
         <head><title>Sonus SBC Exporter</title></head>\n\
         <body>\n\
         <h1>Sonus SBC Exporter</h1>\n\
         <p><a href=\"{path}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n"
    ))
}

/// Runs one collection cycle and renders it with the self-telemetry.
///
/// A cycle that aborts still answers 200 so the scraper keeps receiving the
/// failure counters. The cycle runs on its own task holding the collect
/// lock, so a scraper that disconnects mid-cycle neither abandons the
/// barrier nor lets the next cycle start early.
pub async fn metrics(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> Response {
    let guard = Arc::clone(&state.collect_lock).lock_owned().await;
    let exporter = Arc::clone(&state.exporter);
    let cycle = tokio::spawn(async move {
        let _guard = guard;
        exporter.collect().await
    });

    let report = match cycle.await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(trace_id = %trace_id.0, error = %e, "Collection cycle task failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "collection cycle failed\n").into_response();
        }
    };

    tracing::debug!(
        trace_id = %trace_id.0,
        target_url = report.target.as_deref().unwrap_or("-"),
        aborted = report.error.as_ref().map(|e| e.reason()).unwrap_or("-"),
        observations = report.observations.len(),
        "Rendering cycle"
    );

    match render::render(&report.observations, &state.registry) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(trace_id = %trace_id.0, error = %format!("{e:#}"), "Failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render metrics\n").into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: i64,
}

/// Liveness probe. Never contacts the element.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: (Utc::now() - state.start_time).num_seconds(),
    })
}
