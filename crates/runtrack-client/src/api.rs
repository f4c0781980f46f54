//! Remote API collaborator boundary.

use async_trait::async_trait;
use runtrack_core::QueueRecord;
use std::fmt;
use thiserror::Error;

use crate::config::ConnectionDescriptor;

/// Error from the remote API collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credential refresh failed outright.
    #[error("credential refresh failed: {0}")]
    CredentialRefresh(String),

    /// The completion query failed at the API layer.
    #[error("query failed: {0}")]
    Query(String),
}

/// Access credential obtained from the collaborator's refresh mechanism.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token value.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the transport's authorization header.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Remote API used to refresh credentials and run the authoritative
/// completion query.
#[async_trait]
pub trait RunApi: Send + Sync {
    /// Obtain a fresh access credential for `descriptor`.
    ///
    /// `Ok(None)` means the refresh mechanism produced no usable token.
    async fn refresh_credential(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<Option<AccessToken>, ApiError>;

    /// Query the queue records whose parent job is `run_id`.
    ///
    /// A run id unknown to the backend yields an empty vector.
    async fn query_run_queue(&self, run_id: &str) -> Result<Vec<QueueRecord>, ApiError>;
}
