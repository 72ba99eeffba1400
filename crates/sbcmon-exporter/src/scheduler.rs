use crate::client::Fetcher;
use crate::error::JobPanicked;
use crate::telemetry::{ExporterMetrics, Stage};
use futures::FutureExt;
use sbcmon_collector::{MetricCatalog, MetricClass};
use sbcmon_common::metric::MetricSink;
use sbcmon_common::types::{JobOutcome, Repetition, RequestContext, Topology};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// One fetch-and-convert unit: a class bound to the context it runs in.
#[derive(Clone)]
pub struct Job {
    pub class: Arc<dyn MetricClass>,
    pub ctx: RequestContext,
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("class", &self.class.name())
            .field("ctx", &self.ctx)
            .finish()
    }
}

/// Number of jobs [`plan`] yields for this catalog and topology.
pub fn job_count(catalog: &MetricCatalog, topology: &Topology) -> usize {
    catalog
        .classes()
        .iter()
        .map(|class| topology.expansion_count(class.repetition()))
        .sum()
}

/// Expands every class of the catalog over the discovered topology.
pub fn plan(catalog: &MetricCatalog, target: &str, topology: &Topology) -> Vec<Job> {
    let mut jobs = Vec::with_capacity(job_count(catalog, topology));

    for class in catalog.classes() {
        let mut push = |ctx: RequestContext| {
            jobs.push(Job {
                class: Arc::clone(class),
                ctx,
            })
        };

        match class.repetition() {
            Repetition::None => push(RequestContext::root(target)),
            Repetition::PerPartition => {
                for partition in &topology.partitions {
                    push(RequestContext::for_partition(target, &partition.name));
                }
            }
            Repetition::PerPartitionZone => {
                for partition in &topology.partitions {
                    for zone in &partition.zones {
                        push(RequestContext::for_zone(target, &partition.name, &zone.name));
                    }
                }
            }
            Repetition::PerPartitionInterfaceGroup => {
                for partition in &topology.partitions {
                    for group in &partition.interface_groups {
                        push(RequestContext::for_interface_group(
                            target,
                            &partition.name,
                            &group.name,
                        ));
                    }
                }
            }
        }
    }

    jobs
}

/// Fetches and converts a single job. Transport failures and non-2xx
/// statuses fail the job without invoking the converter.
pub async fn run_job(
    job: &Job,
    fetcher: &dyn Fetcher,
    sink: &MetricSink,
    metrics: &ExporterMetrics,
) -> JobOutcome {
    let name = job.class.name();
    let url = job.class.url(&job.ctx);

    let started = Instant::now();
    let fetched = match fetcher.fetch(&url).await {
        Ok(response) => response.into_body(&url),
        Err(e) => Err(e),
    };
    metrics.observe_duration(name, Stage::Http, started.elapsed());

    let body = match fetched {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(class = name, context = %job.ctx, error = %e, "Unable to fetch metric");
            return JobOutcome::failed(name, e);
        }
    };

    let started = Instant::now();
    let outcome = job.class.process(&job.ctx, &body, sink);
    metrics.observe_duration(name, Stage::Process, started.elapsed());
    outcome
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Spawns one task per job. Every task sends exactly one outcome, including
/// when the job panics, so the returned receiver yields `jobs.len()`
/// outcomes in completion order.
pub fn dispatch(
    jobs: Vec<Job>,
    fetcher: Arc<dyn Fetcher>,
    sink: &MetricSink,
    metrics: &ExporterMetrics,
) -> mpsc::UnboundedReceiver<JobOutcome> {
    let (tx, rx) = mpsc::unbounded_channel();

    for job in jobs {
        let tx = tx.clone();
        let fetcher = Arc::clone(&fetcher);
        let sink = sink.clone();
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let run = run_job(&job, fetcher.as_ref(), &sink, &metrics);
            let outcome = match AssertUnwindSafe(run).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let panicked = JobPanicked {
                        class: job.class.name().to_string(),
                        message: panic_message(payload.as_ref()),
                    };
                    tracing::error!(context = %job.ctx, error = %panicked, "Job panicked");
                    JobOutcome::failed(job.class.name(), panicked)
                }
            };
            // The aggregator only stops listening once it has every outcome.
            let _ = tx.send(outcome);
        });
    }

    rx
}
