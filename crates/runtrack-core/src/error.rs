//! Core domain errors.

use thiserror::Error;

/// Core domain errors for RunTrack.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Run id has an unsupported length.
    #[error("invalid run id '{0}': expected 15 or 18 characters")]
    InvalidRunId(String),
}
