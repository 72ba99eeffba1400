mod common;

use axum::http::{header, StatusCode};
use common::{build_test_context, build_test_context_with, get, test_config, MockElement};
use serde_json::Value;
use sbcmon_server::config::ServerConfig;
use std::time::Duration;

#[tokio::test]
async fn scrape_renders_cycle_and_self_telemetry() {
    let ctx = build_test_context(MockElement::healthy());

    let (status, headers, body) = get(&ctx.app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "text/plain; version=0.0.4"
    );
    assert!(headers.contains_key("x-trace-id"));

    assert!(body.contains(r#"sonus_fan_speed{fanID="FAN1/BOT",server="densbc01a"} 5632"#));
    assert!(body.contains(
        r#"sonus_zone_total_calls_configured{addresscontext="default",zone="ZONE_A"} 100"#
    ));
    assert!(body.contains(
        r#"sonus_zone_usage_total{addresscontext="default",direction="outbound",zone="ZONE_A"} 6"#
    ));
    assert!(body.contains(r#"sonus_exporter_metric_disposition{name="Fan",successful="true"} 1"#));
    assert!(body.contains(
        r#"sonus_exporter_metric_disposition{name="PowerSupply",successful="false"} 1"#
    ));
    // Fan, PowerSupply, DSP, TrunkGroup plus one zone for each per-zone class.
    assert!(body.contains("sonus_exporter_last_cycle_jobs 6"));
}

#[tokio::test]
async fn unreachable_element_still_answers_with_telemetry() {
    let ctx = build_test_context(MockElement::default());

    let (status, _, body) = get(&ctx.app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"sonus_exporter_cycle_failures_total{reason="no_target"} 1"#));
    assert!(!body.contains("sonus_fan_speed"));
    assert_eq!(ctx.element.calls().len(), 1);
}

#[tokio::test]
async fn each_scrape_is_a_fresh_cycle() {
    let ctx = build_test_context(MockElement::healthy());

    let (_, _, first) = get(&ctx.app, "/metrics").await;
    let (_, _, second) = get(&ctx.app, "/metrics").await;

    assert!(first.contains(r#"sonus_fan_speed{fanID="FAN1/BOT",server="densbc01a"} 5632"#));
    assert!(second.contains(r#"sonus_fan_speed{fanID="FAN1/BOT",server="densbc01a"} 5632"#));
    assert!(second.contains(r#"sonus_exporter_metric_disposition{name="Fan",successful="true"} 2"#));
}

#[tokio::test]
async fn concurrent_scrapes_do_not_overlap() {
    let element = MockElement::healthy().with_delay(Duration::from_millis(20));
    let ctx = build_test_context(element);

    let (a, b) = tokio::join!(get(&ctx.app, "/metrics"), get(&ctx.app, "/metrics"));
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);

    assert!(ctx.element.max_in_flight() <= 6);
    // Probe, two listings and six jobs, then the second cycle's probe.
    let probes: Vec<usize> = ctx
        .element
        .calls()
        .iter()
        .enumerate()
        .filter(|(_, url)| url.ends_with("/serverStatus/"))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(probes, vec![0, 9]);
}

#[tokio::test]
async fn health_never_contacts_the_element() {
    let ctx = build_test_context(MockElement::healthy());

    let (status, _, body) = get(&ctx.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["uptime_secs"].as_i64().unwrap() >= 0);
    assert!(ctx.element.calls().is_empty());
}

#[tokio::test]
async fn index_links_the_metrics_path() {
    let config = ServerConfig {
        metrics_path: "/probe".to_string(),
        ..test_config()
    };
    let ctx = build_test_context_with(MockElement::healthy(), config);

    let (status, _, body) = get(&ctx.app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<a href="/probe">"#));

    let (status, _, _) = get(&ctx.app, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, body) = get(&ctx.app, "/probe").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("sonus_fan_speed"));
}

#[tokio::test]
async fn disconnected_scrape_still_completes_its_cycle() {
    let element = MockElement::healthy().with_delay(Duration::from_millis(200));
    let ctx = build_test_context(element);

    // Probe, two listings and the job wave take about 800ms.
    let abandoned =
        tokio::time::timeout(Duration::from_millis(700), get(&ctx.app, "/metrics")).await;
    assert!(abandoned.is_err());

    let (status, _, body) = get(&ctx.app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);

    // The second cycle waited for every job of the first one.
    assert!(ctx.element.max_in_flight() <= 6);
    let probes: Vec<usize> = ctx
        .element
        .calls()
        .iter()
        .enumerate()
        .filter(|(_, url)| url.ends_with("/serverStatus/"))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(probes, vec![0, 9]);
    assert!(body.contains(r#"sonus_exporter_metric_disposition{name="Fan",successful="true"} 2"#));
}
