//! Reconciles inbound push signals against authoritative polled state.

use runtrack_core::{is_valid_run_id, Progress, ProgressEvent, QueueItem, RunId};
use tracing::debug;

use crate::error::TrackerError;
use crate::poller::{CompletionPoller, PollOutcome};

/// Outcome of reconciling one inbound signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// The signal was filtered out, or the run is still executing.
    Pending,
    /// The run resolved: every record reached a terminal status.
    Terminal {
        /// Run that resolved.
        run_id: RunId,
        /// Terminal queue state.
        queue_item: QueueItem,
    },
}

/// Validates correlation of inbound signals and drives the completion
/// poller.
///
/// Ambiguous or unrelated signals become progress observations rather than
/// premature completion.
pub struct EventReconciler {
    poller: CompletionPoller,
    progress: Progress,
}

impl EventReconciler {
    /// Create a reconciler over the given poller.
    pub fn new(poller: CompletionPoller, progress: Progress) -> Self {
        Self { poller, progress }
    }

    /// Reconcile one candidate run id against the active subscription.
    ///
    /// `candidate` is the subject of a push message, or an explicitly
    /// supplied id for an out-of-band poll. A candidate that does not
    /// correlate is dropped silently and reported as pending: the push
    /// channel is shared, so foreign events are expected, not errors.
    pub async fn reconcile(
        &self,
        candidate: &str,
        subscribed: Option<&RunId>,
    ) -> Result<Reconciled, TrackerError> {
        if !is_valid_run_id(candidate, subscribed) {
            debug!(candidate, "Dropping uncorrelated push event");
            return Ok(Reconciled::Pending);
        }

        let run_id = match subscribed {
            Some(id) => id.clone(),
            None => RunId::parse(candidate)?,
        };

        match self.poller.poll(&run_id).await? {
            PollOutcome::Terminal(queue_item) => Ok(Reconciled::Terminal { run_id, queue_item }),
            PollOutcome::Pending => {
                self.progress.report(ProgressEvent::RunProcessing {
                    run_id: run_id.clone(),
                });
                Ok(Reconciled::Pending)
            }
        }
    }
}
