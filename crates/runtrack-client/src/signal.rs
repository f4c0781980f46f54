//! Single-assignment run id signal.
//!
//! Callers may need the run id (for logging, for correlating) before or
//! independent of the terminal completion result, and the id only exists
//! once the start action resolves. The signal hands it to any number of
//! waiters exactly once.

use runtrack_core::RunId;
use tokio::sync::watch;

/// Write half of the run id signal. First assignment wins; later attempts
/// leave the original value in place.
#[derive(Debug)]
pub struct RunIdSignal {
    tx: watch::Sender<Option<RunId>>,
}

/// Read half of the run id signal.
///
/// Cheap to clone; any number of waiters may park on it before the id is
/// assigned.
#[derive(Debug, Clone)]
pub struct RunIdWaiter {
    rx: watch::Receiver<Option<RunId>>,
}

impl RunIdSignal {
    /// Create an unassigned signal and its waiter handle.
    pub fn new() -> (Self, RunIdWaiter) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, RunIdWaiter { rx })
    }

    /// Assign the run id. Returns false if a value was already assigned.
    pub fn resolve(&self, run_id: RunId) -> bool {
        self.tx.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(run_id);
                true
            } else {
                false
            }
        })
    }

    /// The assigned id, if any.
    pub fn get(&self) -> Option<RunId> {
        self.tx.borrow().clone()
    }
}

impl RunIdWaiter {
    /// Wait until the run id is assigned.
    ///
    /// Every call after assignment returns the same value immediately.
    /// Returns `None` only if the session went away without ever assigning
    /// an id.
    pub async fn wait(&mut self) -> Option<RunId> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(value) => value.clone(),
            Err(_) => None,
        }
    }

    /// The assigned id, if any, without waiting.
    pub fn get(&self) -> Option<RunId> {
        self.rx.borrow().clone()
    }
}
