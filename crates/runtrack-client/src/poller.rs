//! Authoritative completion polling.

use runtrack_core::{Progress, ProgressEvent, QueueItem, RunId};
use std::sync::Arc;
use tracing::debug;

use crate::api::RunApi;
use crate::error::TrackerError;

/// Outcome of one completion poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// At least one record is still active.
    Pending,
    /// Every record reached a terminal status.
    Terminal(QueueItem),
}

/// Issues the authoritative status query for a run and classifies the
/// result.
///
/// There is no internal retry or backoff: pushed-event arrival drives the
/// poll cadence, not a timer.
pub struct CompletionPoller {
    api: Arc<dyn RunApi>,
    progress: Progress,
}

impl CompletionPoller {
    /// Create a poller over the given API collaborator.
    pub fn new(api: Arc<dyn RunApi>, progress: Progress) -> Self {
        Self { api, progress }
    }

    /// Query the queue state of `run_id` once.
    ///
    /// Emits a full queue snapshot for every non-empty result, terminal or
    /// not. Zero records means the backend does not know the run id and
    /// surfaces as [`TrackerError::NoResults`].
    pub async fn poll(&self, run_id: &RunId) -> Result<PollOutcome, TrackerError> {
        let records = self.api.query_run_queue(run_id.as_str()).await?;
        if records.is_empty() {
            return Err(TrackerError::NoResults(run_id.clone()));
        }

        let item = QueueItem::new(records);
        self.progress.report(ProgressEvent::QueueSnapshot { item: item.clone() });

        if item.is_complete() {
            debug!(run_id = %run_id, records = item.records.len(), "Run reached terminal state");
            Ok(PollOutcome::Terminal(item))
        } else {
            debug!(run_id = %run_id, active = item.active_count(), "Run still pending");
            Ok(PollOutcome::Pending)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::testing::{CollectingSink, ScriptedApi};
    use runtrack_core::{QueueRecord, TestTaskStatus};

    fn run_id() -> RunId {
        RunId::parse("9TS1234567890AB").unwrap()
    }

    fn poller_with_sink(api: ScriptedApi) -> (CompletionPoller, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::default());
        let poller = CompletionPoller::new(Arc::new(api), Progress::new(sink.clone()));
        (poller, sink)
    }

    #[tokio::test]
    async fn test_all_terminal_returns_item() {
        let api = ScriptedApi::with_token();
        api.push_response(Ok(vec![
            QueueRecord::new("709xx0000000001", TestTaskStatus::Completed),
            QueueRecord::new("709xx0000000002", TestTaskStatus::Failed),
        ]));
        let (poller, sink) = poller_with_sink(api);

        let outcome = poller.poll(&run_id()).await.unwrap();
        match outcome {
            PollOutcome::Terminal(item) => assert_eq!(item.records.len(), 2),
            PollOutcome::Pending => panic!("expected terminal"),
        }
        assert_eq!(sink.snapshot_count(), 1);
    }

    #[tokio::test]
    async fn test_single_active_record_is_pending_with_one_snapshot() {
        let api = ScriptedApi::with_token();
        api.push_response(Ok(vec![
            QueueRecord::new("709xx0000000001", TestTaskStatus::Completed),
            QueueRecord::new("709xx0000000002", TestTaskStatus::Queued),
        ]));
        let (poller, sink) = poller_with_sink(api);

        let outcome = poller.poll(&run_id()).await.unwrap();
        assert_eq!(outcome, PollOutcome::Pending);
        assert_eq!(sink.snapshot_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_records_is_no_results() {
        let api = ScriptedApi::with_token();
        api.push_response(Ok(vec![]));
        let (poller, sink) = poller_with_sink(api);

        let err = poller.poll(&run_id()).await.unwrap_err();
        assert!(matches!(err, TrackerError::NoResults(id) if id == run_id()));
        assert_eq!(sink.snapshot_count(), 0);
    }

    #[tokio::test]
    async fn test_api_failure_surfaces() {
        let api = ScriptedApi::with_token();
        api.push_response(Err(ApiError::Query("backend unavailable".to_string())));
        let (poller, _sink) = poller_with_sink(api);

        let err = poller.poll(&run_id()).await.unwrap_err();
        assert!(matches!(err, TrackerError::Api(_)));
    }
}
