//! Typed progress events and the optional progress sink.

use crate::ids::RunId;
use crate::queue::QueueItem;
use std::fmt;
use std::sync::Arc;

/// A progress observation emitted while a run is being tracked.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The push transport came up.
    TransportUp,
    /// The push transport went down.
    TransportDown,
    /// The run is known to the backend and still executing.
    RunProcessing {
        /// Run the observation pertains to.
        run_id: RunId,
    },
    /// Full snapshot of the run's queue state after a poll.
    QueueSnapshot {
        /// The polled queue state.
        item: QueueItem,
    },
}

/// Consumer of progress events.
///
/// Delivery is fire-and-forget; implementations must not block and must not
/// fail the tracking operation.
pub trait ProgressSink: Send + Sync {
    /// Handle a single progress event.
    fn report(&self, event: ProgressEvent);
}

/// Optional progress capability injected at construction.
///
/// Absence of a sink makes every report a no-op, so call sites never guard.
#[derive(Clone, Default)]
pub struct Progress {
    sink: Option<Arc<dyn ProgressSink>>,
}

impl Progress {
    /// A progress handle with no sink attached.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// A progress handle delivering to `sink`.
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Report an event to the sink, if any.
    pub fn report(&self, event: ProgressEvent) {
        if let Some(sink) = &self.sink {
            sink.report(event);
        }
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("enabled", &self.sink.is_some())
            .finish()
    }
}
