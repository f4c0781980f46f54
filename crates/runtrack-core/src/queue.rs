//! Authoritative queue state for a test run.

use crate::status::TestTaskStatus;
use serde::{Deserialize, Serialize};

/// One sub-task record of a test run, as returned by the completion query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRecord {
    /// Record identifier.
    #[serde(rename = "Id")]
    pub id: String,

    /// Current status of this record.
    #[serde(rename = "Status")]
    pub status: TestTaskStatus,
}

impl QueueRecord {
    /// Create a new QueueRecord.
    pub fn new(id: impl Into<String>, status: TestTaskStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}

/// The authoritative state of one test run: the full set of its queued
/// sub-task records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Records belonging to the run.
    pub records: Vec<QueueRecord>,
}

impl QueueItem {
    /// Create a QueueItem from queried records.
    pub fn new(records: Vec<QueueRecord>) -> Self {
        Self { records }
    }

    /// A run is complete only when every record has reached a terminal
    /// status. A single active record keeps the whole run pending.
    pub fn is_complete(&self) -> bool {
        self.records.iter().all(|r| r.status.is_terminal())
    }

    /// Count of records still in an active status.
    pub fn active_count(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_active()).count()
    }
}
