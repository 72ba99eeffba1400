use crate::telemetry::ExporterMetrics;
use sbcmon_common::types::JobOutcome;
use tokio::sync::mpsc;

/// Completion barrier for one cycle.
///
/// Consumes outcomes until exactly `expected` have arrived, recording the
/// disposition of each. Returns immediately when `expected` is zero. If
/// every sender is dropped early the outcomes received so far are returned.
pub async fn collect_outcomes(
    mut outcomes: mpsc::UnboundedReceiver<JobOutcome>,
    expected: usize,
    metrics: &ExporterMetrics,
) -> Vec<JobOutcome> {
    let mut received = Vec::with_capacity(expected);

    while received.len() < expected {
        let Some(outcome) = outcomes.recv().await else {
            tracing::error!(
                received = received.len(),
                expected,
                "Outcome channel closed before every job reported"
            );
            break;
        };
        metrics.record_disposition(&outcome.class, outcome.success);
        received.push(outcome);
    }

    received
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn zero_expected_returns_without_waiting() {
        let (_tx, rx) = mpsc::unbounded_channel::<JobOutcome>();
        let metrics = ExporterMetrics::new().unwrap();
        let outcomes = tokio::time::timeout(
            Duration::from_millis(100),
            collect_outcomes(rx, 0, &metrics),
        )
        .await
        .expect("barrier should not wait");
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn returns_after_last_outcome_and_counts_dispositions() {
        let (tx, rx) = mpsc::unbounded_channel();
        let metrics = ExporterMetrics::new().unwrap();

        tokio::spawn(async move {
            for i in 0..3 {
                tokio::time::sleep(Duration::from_millis(5 * i)).await;
                let outcome = if i == 1 {
                    JobOutcome::failed("Fan", std::io::Error::other("boom"))
                } else {
                    JobOutcome::succeeded("Fan")
                };
                tx.send(outcome).unwrap();
            }
            // Keep the sender alive past the barrier to prove it does not
            // wait for channel closure.
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let outcomes = tokio::time::timeout(
            Duration::from_secs(5),
            collect_outcomes(rx, 3, &metrics),
        )
        .await
        .expect("barrier should release after the third outcome");
        assert_eq!(outcomes.len(), 3);
        assert_eq!(metrics.disposition("Fan", true), 2.0);
        assert_eq!(metrics.disposition("Fan", false), 1.0);
    }

    #[tokio::test]
    async fn closed_channel_releases_barrier() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(JobOutcome::succeeded("Fan")).unwrap();
        drop(tx);
        let metrics = ExporterMetrics::new().unwrap();
        let outcomes = collect_outcomes(rx, 2, &metrics).await;
        assert_eq!(outcomes.len(), 1);
    }
}
