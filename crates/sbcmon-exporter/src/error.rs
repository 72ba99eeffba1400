use sbcmon_common::types::JobError;
use std::time::Duration;

/// Errors from a single request against the monitored element.
///
/// # Examples
///
/// ```rust
/// use sbcmon_exporter::error::FetchError;
///
/// let err = FetchError::Status { url: "https://sbc/api/x".to_string(), status: 503 };
/// assert!(err.to_string().contains("503"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The per-request deadline elapsed.
    #[error("request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    /// Connection, TLS or body read failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: JobError,
    },

    /// The element answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Timeout { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Status { url, .. } => url,
        }
    }
}

/// Conditions that end a cycle before any repeated job is dispatched.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("no live target among {candidates} candidate endpoint(s)")]
    NoLiveTarget { candidates: usize },

    #[error("topology discovery failed for address context {partition} at {url}: {source}")]
    Topology {
        partition: String,
        url: String,
        #[source]
        source: JobError,
    },
}

impl CycleError {
    /// Value of the `reason` label on the cycle failure counter.
    pub fn reason(&self) -> &'static str {
        match self {
            CycleError::NoLiveTarget { .. } => "no_target",
            CycleError::Topology { .. } => "topology",
        }
    }
}

/// Outcome error for a job whose future panicked.
#[derive(Debug, thiserror::Error)]
#[error("{class} job panicked: {message}")]
pub struct JobPanicked {
    pub class: String,
    pub message: String,
}
