//! Status vocabulary for test queue records.

use serde::{Deserialize, Serialize};

/// Status of a single queued test task record.
///
/// The backend owns the full vocabulary. Only the four active states keep a
/// run pending; every other value, including ones this client does not
/// recognize, counts as terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestTaskStatus {
    /// Waiting in the queue.
    #[default]
    Queued,
    /// Held back from processing.
    Holding,
    /// Being prepared for execution.
    Preparing,
    /// Actively executing.
    Processing,
    /// Finished successfully.
    Completed,
    /// Finished with failures.
    Failed,
    /// Cancelled before completion.
    Aborted,
    /// Any status value this client does not recognize.
    #[serde(other)]
    Other,
}

impl TestTaskStatus {
    /// Returns true if no further transition will occur for this record.
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if the record can still make progress.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Queued | Self::Holding | Self::Preparing | Self::Processing
        )
    }
}
