//! Newtype wrappers for identifiers to ensure type safety.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::CoreError;

/// Length of the short form of a run id.
pub const RUN_ID_SHORT_LEN: usize = 15;

/// Length of the long form of a run id.
pub const RUN_ID_LONG_LEN: usize = 18;

/// Leading characters shared by the short and long forms of the same run.
pub const CORRELATION_PREFIX_LEN: usize = 14;

/// Unique identifier for a test run, assigned by the backend when the run
/// is started.
///
/// Two forms are accepted: a 15-character short form and an 18-character
/// long form. Both are case-sensitive. The first 14 characters are the
/// correlation key equating the two forms of the same run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Parse a run id, validating its length.
    pub fn parse(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if !has_valid_length(&id) {
            return Err(CoreError::InvalidRunId(id));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The leading characters correlating the short and long forms.
    pub fn correlation_prefix(&self) -> &str {
        &self.0[..CORRELATION_PREFIX_LEN.min(self.0.len())]
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns true if `candidate` has one of the two accepted run id lengths.
fn has_valid_length(candidate: &str) -> bool {
    candidate.len() == RUN_ID_SHORT_LEN || candidate.len() == RUN_ID_LONG_LEN
}

/// Validate a candidate run id against the currently subscribed id.
///
/// A candidate of invalid length is always rejected. Before a subscription
/// id is known, any length-valid candidate is accepted (first contact).
/// Once an id is known, the candidate must share its correlation prefix,
/// compared case-sensitively with no normalization.
pub fn is_valid_run_id(candidate: &str, subscribed: Option<&RunId>) -> bool {
    if !has_valid_length(candidate) {
        return false;
    }
    match subscribed {
        None => true,
        Some(id) => candidate
            .bytes()
            .take(CORRELATION_PREFIX_LEN)
            .eq(id.as_str().bytes().take(CORRELATION_PREFIX_LEN)),
    }
}

/// Locally generated identifier tagging one subscription attempt in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random SessionId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
