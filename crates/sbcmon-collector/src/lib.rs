//! Metric catalog for the sbcmon exporter.
//!
//! Each [`MetricClass`] describes one operational-status document on the
//! monitored element: where to fetch it, how often to repeat the fetch across
//! the discovered topology and how to turn the XML response into
//! [`Observation`](sbcmon_common::metric::Observation)s. The
//! [`MetricCatalog`] is built once at startup and shared read-only.

pub mod dsp;
pub mod error;
pub mod fan;
pub mod ip_interface;
pub mod power_supply;
pub mod sip_ars;
pub mod sip_statistics;
pub mod topology;
pub mod trunk_group;
mod xml;

use error::ConvertError;
use sbcmon_common::metric::{MetricDesc, MetricSink};
use sbcmon_common::types::{JobOutcome, Repetition, RequestContext};
use std::sync::Arc;

/// A catalog-registered unit of "what to fetch, how often to repeat it, how
/// to convert it".
///
/// Implementations are stateless; a single instance serves every job of its
/// class concurrently.
pub trait MetricClass: Send + Sync {
    /// Class name, used as the `name` label of the disposition counter.
    fn name(&self) -> &str;

    fn repetition(&self) -> Repetition;

    /// Builds the request URL for one job from its context.
    fn url(&self, ctx: &RequestContext) -> String;

    /// Descriptors of every metric [`convert`](Self::convert) may emit.
    fn descriptors(&self) -> &'static [&'static MetricDesc];

    /// Decodes a response body and writes its observations to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the body does not match the expected document.
    fn convert(
        &self,
        ctx: &RequestContext,
        body: &[u8],
        sink: &MetricSink,
    ) -> Result<(), ConvertError>;

    /// Runs [`convert`](Self::convert) and folds the result into a job
    /// outcome. An empty body is a successful conversion with no
    /// observations.
    fn process(&self, ctx: &RequestContext, body: &[u8], sink: &MetricSink) -> JobOutcome {
        if body.iter().all(u8::is_ascii_whitespace) {
            tracing::debug!(class = self.name(), context = %ctx, "Empty response, nothing to convert");
            return JobOutcome::succeeded(self.name());
        }

        match self.convert(ctx, body, sink) {
            Ok(()) => {
                tracing::debug!(class = self.name(), context = %ctx, "Metrics collected");
                JobOutcome::succeeded(self.name())
            }
            Err(e) => {
                tracing::warn!(class = self.name(), context = %ctx, error = %e, "Failed to convert response");
                JobOutcome::failed(self.name(), e)
            }
        }
    }
}

/// Immutable registry of [`MetricClass`]es.
///
/// # Examples
///
/// ```
/// use sbcmon_collector::MetricCatalog;
/// use sbcmon_common::types::Repetition;
///
/// let catalog = MetricCatalog::default();
/// assert!(catalog.get("Fan").is_some());
/// assert_eq!(catalog.count_by_repetition(Repetition::PerPartitionZone), 2);
/// assert!(catalog.get("nonexistent").is_none());
/// ```
#[derive(Clone)]
pub struct MetricCatalog {
    classes: Vec<Arc<dyn MetricClass>>,
}

impl MetricCatalog {
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
        }
    }

    /// Adds a class. Later registrations with the same name replace earlier
    /// ones so each name maps to exactly one class.
    pub fn register(&mut self, class: Arc<dyn MetricClass>) {
        self.classes.retain(|c| c.name() != class.name());
        self.classes.push(class);
    }

    pub fn with(mut self, class: Arc<dyn MetricClass>) -> Self {
        self.register(class);
        self
    }

    pub fn classes(&self) -> &[Arc<dyn MetricClass>] {
        &self.classes
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn MetricClass>> {
        self.classes.iter().find(|c| c.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn count_by_repetition(&self, repetition: Repetition) -> usize {
        self.classes
            .iter()
            .filter(|c| c.repetition() == repetition)
            .count()
    }

    /// Every descriptor the catalog's classes may emit.
    pub fn descriptors(&self) -> impl Iterator<Item = &'static MetricDesc> + '_ {
        self.classes
            .iter()
            .flat_map(|c| c.descriptors().iter().copied())
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::new()
            .with(Arc::new(fan::FanMetric))
            .with(Arc::new(power_supply::PowerSupplyMetric))
            .with(Arc::new(dsp::DspMetric))
            .with(Arc::new(trunk_group::TrunkGroupMetric))
            .with(Arc::new(ip_interface::IpInterfaceMetric))
            .with(Arc::new(sip_statistics::SipStatisticMetric))
            .with(Arc::new(sip_ars::SipArsMetric))
    }
}
