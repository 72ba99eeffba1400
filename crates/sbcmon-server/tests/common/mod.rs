#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use prometheus::Registry;
use sbcmon_collector::MetricCatalog;
use sbcmon_exporter::client::{FetchResponse, Fetcher};
use sbcmon_exporter::error::FetchError;
use sbcmon_exporter::telemetry::ExporterMetrics;
use sbcmon_exporter::Exporter;
use sbcmon_server::app;
use sbcmon_server::config::ServerConfig;
use sbcmon_server::state::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;

pub const BASE: &str = "https://sbc.test/api";

pub const ZONES: &str = r#"<collection xmlns:y="http://tail-f.com/ns/rest">
  <zoneStatus xmlns="http://sonusnet.com/ns/mibs/SONUS-ZONE/1.0">
    <name>ZONE_A</name>
    <inboundCallsUsage>4</inboundCallsUsage>
    <outboundCallsUsage>6</outboundCallsUsage>
    <totalCallsConfigured>100</totalCallsConfigured>
  </zoneStatus>
</collection>"#;

pub const FANS: &str = r#"<collection xmlns:y="http://tail-f.com/ns/rest">
  <fanStatus xmlns="http://sonusnet.com/ns/mibs/SONUS-SYSTEM-MIB/1.0">
    <serverName>densbc01a</serverName>
    <fanId>FAN1/BOT</fanId>
    <speed>5632 RPM</speed>
  </fanStatus>
</collection>"#;

/// In-memory element: canned bodies per URL, 404 for everything else.
#[derive(Default)]
pub struct MockElement {
    bodies: HashMap<String, String>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockElement {
    pub fn with(mut self, path: &str, body: &str) -> Self {
        self.bodies.insert(format!("{BASE}{path}"), body.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// A live element with one zone in the default context and no
    /// interface groups.
    pub fn healthy() -> Self {
        Self::default()
            .with("/operational/system/serverStatus/", "")
            .with("/operational/addressContext/default/zoneStatus/", ZONES)
            .with("/operational/addressContext/default/ipInterfaceGroup/", "")
            .with("/operational/system/fanStatus/", FANS)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockElement {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(match self.bodies.get(url) {
            Some(body) => FetchResponse::new(200, body.as_bytes()),
            None => FetchResponse::new(404, Vec::new()),
        })
    }
}

pub struct TestContext {
    pub element: Arc<MockElement>,
    pub state: AppState,
    pub app: axum::Router,
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        api_urls: vec![BASE.to_string()],
        ..ServerConfig::default()
    }
}

pub fn build_test_context(element: MockElement) -> TestContext {
    build_test_context_with(element, test_config())
}

pub fn build_test_context_with(element: MockElement, config: ServerConfig) -> TestContext {
    let element = Arc::new(element);
    let registry = Registry::new();
    let metrics = ExporterMetrics::registered(&registry).expect("metrics should register");
    let exporter = Exporter::new(
        config.exporter_config(),
        Arc::new(MetricCatalog::default()),
        element.clone(),
        metrics,
    );
    let state = AppState::new(exporter, registry, config);
    let app = app::build_http_app(state.clone());

    TestContext {
        element,
        state,
        app,
    }
}

pub async fn get(app: &axum::Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should succeed");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let body = String::from_utf8(bytes.to_vec()).expect("body should be utf-8");
    (status, headers, body)
}
