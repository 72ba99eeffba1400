use anyhow::{Context, Result};
use prometheus::Registry;
use sbcmon_collector::MetricCatalog;
use sbcmon_exporter::client::HttpFetcher;
use sbcmon_exporter::telemetry::ExporterMetrics;
use sbcmon_exporter::Exporter;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use sbcmon_server::app;
use sbcmon_server::config::{ServerConfig, DEFAULT_CONFIG_PATH};
use sbcmon_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ServerConfig::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("sbcmon={}", config.log_level).parse()?),
        )
        .init();

    run_server(config).await
}

async fn run_server(config: ServerConfig) -> Result<()> {
    tracing::info!(
        listen_port = config.listen_port,
        metrics_path = %config.metrics_path,
        api_urls = ?config.api_urls,
        api_user = %config.api_user,
        api_password = config.redacted_password(),
        address_contexts = ?config.address_contexts,
        api_timeout_secs = config.api_timeout_secs,
        "sbcmon-server starting"
    );

    let fetcher = HttpFetcher::new(
        config.credentials(),
        config.api_timeout(),
        config.accept_invalid_certs,
    )?;

    let registry = Registry::new();
    let metrics = ExporterMetrics::registered(&registry)
        .context("Failed to register exporter metrics")?;
    let catalog = Arc::new(MetricCatalog::default());
    tracing::info!(classes = ?catalog.names(), "Metric catalog loaded");

    let exporter = Exporter::new(config.exporter_config(), catalog, Arc::new(fetcher), metrics);
    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let state = AppState::new(exporter, registry, config);
    let http_app = app::build_http_app(state);

    let listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("Failed to bind {http_addr}"))?;
    tracing::info!(http = %http_addr, "Server started");

    axum::serve(listener, http_app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await
        .context("HTTP server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
