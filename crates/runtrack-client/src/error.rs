//! Tracker error taxonomy.

use runtrack_core::{CoreError, RunId};
use std::time::Duration;
use thiserror::Error;

use crate::api::ApiError;

/// Boxed error carried through the start action unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors aborting a tracking operation.
///
/// None of these are retried internally; retry, if desired, is a caller
/// concern. Non-matching push messages and non-terminal polls are not
/// errors and never surface here.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Credential refresh produced no usable token.
    #[error("no access token available; credential refresh produced nothing usable")]
    NoAccessToken,

    /// Transport-reported error during the handshake step.
    #[error("transport handshake failed: {0}")]
    HandshakeFailed(String),

    /// Transport-reported error outside the handshake.
    #[error("transport error: {0}")]
    Transport(String),

    /// The completion query returned zero records for the run id.
    #[error("no queue records found for run {0}")]
    NoResults(RunId),

    /// The start action failed; a subscription without a run id is useless.
    #[error("failed to start run: {0}")]
    SubscriptionSetup(#[source] BoxError),

    /// The subscription stayed open past the idle ceiling.
    #[error("subscription did not resolve within {0:?}")]
    IdleTimeout(Duration),

    /// Lifecycle misuse.
    #[error("invalid client state: expected {expected}, was {actual}")]
    InvalidState {
        /// Stage the operation requires.
        expected: &'static str,
        /// Stage the client was in.
        actual: &'static str,
    },

    /// Remote API failure.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Domain-level validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}
