//! Value types shared by the sbcmon crates.
//!
//! [`types`] holds the per-cycle topology records, the request context handed
//! to every job and the job outcome. [`metric`] holds metric descriptors, the
//! observations produced by converters and the [`metric::MetricSink`] they are
//! written to.

pub mod metric;
pub mod types;
