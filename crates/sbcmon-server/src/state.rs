use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use prometheus::Registry;
use sbcmon_exporter::Exporter;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub exporter: Arc<Exporter>,
    /// Process-wide self-telemetry, rendered after every cycle.
    pub registry: Registry,
    /// Held for the whole of a scrape so cycles never overlap.
    pub collect_lock: Arc<Mutex<()>>,
    pub start_time: DateTime<Utc>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(exporter: Exporter, registry: Registry, config: ServerConfig) -> Self {
        Self {
            exporter: Arc::new(exporter),
            registry,
            collect_lock: Arc::new(Mutex::new(())),
            start_time: Utc::now(),
            config: Arc::new(config),
        }
    }
}
