use crate::client::Fetcher;
use crate::error::CycleError;

/// Lightweight status document used to check that an element is up.
pub const PROBE_PATH: &str = "/operational/system/serverStatus/";

pub fn probe_url(candidate: &str) -> String {
    format!("{candidate}{PROBE_PATH}")
}

/// Probes candidates one at a time, in order, and returns the first one
/// that answers with a 2xx status. Later candidates are never probed once
/// one succeeds.
///
/// # Errors
///
/// Returns [`CycleError::NoLiveTarget`] if every candidate fails.
pub async fn select(fetcher: &dyn Fetcher, candidates: &[String]) -> Result<String, CycleError> {
    for (index, candidate) in candidates.iter().enumerate() {
        let url = probe_url(candidate);
        match fetcher.fetch(&url).await {
            Ok(response) if response.is_success() => {
                tracing::info!(target_url = %candidate, index, "Using API endpoint");
                return Ok(candidate.clone());
            }
            Ok(response) => {
                tracing::warn!(
                    candidate = %candidate,
                    index,
                    status = response.status,
                    "Candidate endpoint answered with non-success status"
                );
            }
            Err(e) => {
                tracing::warn!(candidate = %candidate, index, error = %e, "Candidate endpoint probe failed");
            }
        }
    }

    tracing::error!(candidates = candidates.len(), "Unable to find an active element among candidate endpoints");
    Err(CycleError::NoLiveTarget {
        candidates: candidates.len(),
    })
}
