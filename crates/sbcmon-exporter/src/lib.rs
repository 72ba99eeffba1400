//! Collection orchestrator.
//!
//! One call to [`Exporter::collect`] is one cycle: pick a live element from
//! the candidate endpoints, discover the zones and interface groups of every
//! configured address context, expand the metric catalog into jobs, run
//! them concurrently and wait until every job has reported.

pub mod aggregator;
pub mod client;
pub mod error;
pub mod scheduler;
pub mod target;
pub mod telemetry;
pub mod topology;


use client::Fetcher;
use error::CycleError;
use sbcmon_collector::MetricCatalog;
use sbcmon_common::metric::{MetricSink, Observation};
use sbcmon_common::types::{JobOutcome, Topology};
use std::sync::Arc;
use telemetry::ExporterMetrics;

/// Read-only inputs of every cycle.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Candidate base addresses, in priority order, without trailing slash.
    pub candidates: Vec<String>,
    /// Address contexts whose topology is discovered each cycle.
    pub partitions: Vec<String>,
}

/// Everything one cycle produced.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub target: Option<String>,
    pub topology: Topology,
    pub dispatched: usize,
    pub outcomes: Vec<JobOutcome>,
    pub observations: Vec<Observation>,
    /// Set when the cycle ended before dispatching jobs.
    pub error: Option<CycleError>,
}

impl CycleReport {
    fn aborted(error: CycleError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

pub struct Exporter {
    config: ExporterConfig,
    catalog: Arc<MetricCatalog>,
    fetcher: Arc<dyn Fetcher>,
    metrics: ExporterMetrics,
}

impl Exporter {
    pub fn new(
        config: ExporterConfig,
        catalog: Arc<MetricCatalog>,
        fetcher: Arc<dyn Fetcher>,
        metrics: ExporterMetrics,
    ) -> Self {
        Self {
            config,
            catalog,
            fetcher,
            metrics,
        }
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn metrics(&self) -> &ExporterMetrics {
        &self.metrics
    }

    /// Runs one collection cycle.
    ///
    /// Cycle-level failures are reported in [`CycleReport::error`] with no
    /// observations; job failures only show up in the outcomes and the
    /// disposition counter. Callers must not overlap invocations.
    pub async fn collect(&self) -> CycleReport {
        let (sink, observations) = MetricSink::channel();

        let target = match target::select(self.fetcher.as_ref(), &self.config.candidates).await {
            Ok(target) => target,
            Err(e) => return self.abort(e),
        };

        let topology = match topology::discover(
            self.fetcher.as_ref(),
            &target,
            &self.config.partitions,
            &sink,
        )
        .await
        {
            Ok(topology) => topology,
            // Zone usage already emitted for earlier partitions goes with the
            // receiver.
            Err(e) => return self.abort(e),
        };

        let jobs = scheduler::plan(&self.catalog, &target, &topology);
        let dispatched = jobs.len();
        self.metrics.set_last_cycle_jobs(dispatched);
        tracing::debug!(
            target_url = %target,
            partitions = topology.partition_count(),
            zones = topology.zone_count(),
            interface_groups = topology.interface_group_count(),
            jobs = dispatched,
            "Dispatching jobs"
        );

        let outcomes_rx = scheduler::dispatch(jobs, Arc::clone(&self.fetcher), &sink, &self.metrics);
        drop(sink);
        let outcomes = aggregator::collect_outcomes(outcomes_rx, dispatched, &self.metrics).await;

        let report = CycleReport {
            target: Some(target),
            topology,
            dispatched,
            outcomes,
            observations: observations.drain(),
            error: None,
        };
        tracing::info!(
            dispatched = report.dispatched,
            succeeded = report.succeeded(),
            failed = report.failed(),
            observations = report.observations.len(),
            "Collection cycle complete"
        );
        report
    }

    /// The selector and the discoverer have already logged the failure.
    fn abort(&self, error: CycleError) -> CycleReport {
        self.metrics.record_cycle_failure(error.reason());
        self.metrics.set_last_cycle_jobs(0);
        CycleReport::aborted(error)
    }
}
