//! Exporter self-telemetry.
//!
//! Owned by the process and registered once into the server's registry; the
//! orchestrator updates it as cycles run.

use prometheus::{CounterVec, HistogramOpts, HistogramVec, IntGauge, Opts, Registry};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Request to the element.
    Http,
    /// Conversion of the response body.
    Process,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Http => "http",
            Stage::Process => "process",
        }
    }
}

#[derive(Clone)]
pub struct ExporterMetrics {
    disposition: CounterVec,
    duration: HistogramVec,
    cycle_failures: CounterVec,
    last_cycle_jobs: IntGauge,
}

impl ExporterMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let disposition = CounterVec::new(
            Opts::new(
                "sonus_exporter_metric_disposition",
                "Number of times each metric has succeeded or failed being collected",
            ),
            &["name", "successful"],
        )?;

        let duration = HistogramVec::new(
            HistogramOpts::new(
                "sonus_exporter_metric_duration_seconds",
                "How long metrics took to query and process",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["name", "stage"],
        )?;

        let cycle_failures = CounterVec::new(
            Opts::new(
                "sonus_exporter_cycle_failures_total",
                "Collection cycles aborted before dispatching jobs",
            ),
            &["reason"],
        )?;

        let last_cycle_jobs = IntGauge::new(
            "sonus_exporter_last_cycle_jobs",
            "Jobs dispatched by the most recent collection cycle",
        )?;

        Ok(Self {
            disposition,
            duration,
            cycle_failures,
            last_cycle_jobs,
        })
    }

    /// Creates the metrics and registers them into `registry`.
    pub fn registered(registry: &Registry) -> prometheus::Result<Self> {
        let metrics = Self::new()?;
        registry.register(Box::new(metrics.disposition.clone()))?;
        registry.register(Box::new(metrics.duration.clone()))?;
        registry.register(Box::new(metrics.cycle_failures.clone()))?;
        registry.register(Box::new(metrics.last_cycle_jobs.clone()))?;
        Ok(metrics)
    }

    pub fn record_disposition(&self, class: &str, success: bool) {
        self.disposition
            .with_label_values(&[class, if success { "true" } else { "false" }])
            .inc();
    }

    pub fn observe_duration(&self, class: &str, stage: Stage, elapsed: Duration) {
        self.duration
            .with_label_values(&[class, stage.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_cycle_failure(&self, reason: &str) {
        self.cycle_failures.with_label_values(&[reason]).inc();
    }

    pub fn set_last_cycle_jobs(&self, jobs: usize) {
        self.last_cycle_jobs
            .set(i64::try_from(jobs).unwrap_or(i64::MAX));
    }

    pub fn disposition(&self, class: &str, success: bool) -> f64 {
        self.disposition
            .with_label_values(&[class, if success { "true" } else { "false" }])
            .get()
    }

    pub fn cycle_failures(&self, reason: &str) -> f64 {
        self.cycle_failures.with_label_values(&[reason]).get()
    }

    pub fn last_cycle_jobs(&self) -> i64 {
        self.last_cycle_jobs.get()
    }
}
