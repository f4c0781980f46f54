//! Push-transport collaborator boundary.
//!
//! The transport owns the wire protocol (handshake/connect/publish
//! framing); this crate only drives its lifecycle and consumes the inbound
//! event stream it hands back on subscribe.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Error reported by the push transport.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportFault(pub String);

impl TransportFault {
    /// Create a fault carrying the transport's error detail.
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// Inbound event delivered by the push transport.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The underlying connection became available.
    Up,
    /// The underlying connection was lost; the transport may recover it.
    Down,
    /// A message published on the subscribed channel, as raw JSON.
    Message(serde_json::Value),
    /// A transport-level error report, protocol errors included.
    Error(String),
}

/// Streaming push transport, consumed as a ready-made abstraction.
#[async_trait]
pub trait StreamingTransport: Send {
    /// Inject the authorization header used for subsequent connects.
    fn set_auth_header(&mut self, header: &str);

    /// Open the connection to `url`, bounded by `timeout`.
    async fn connect(&mut self, url: &str, timeout: Duration) -> Result<(), TransportFault>;

    /// Perform the protocol handshake. Resolves when the transport signals
    /// handshake completion.
    async fn handshake(&mut self) -> Result<(), TransportFault>;

    /// Subscribe to `channel`, returning its inbound event stream.
    async fn subscribe(
        &mut self,
        channel: &str,
    ) -> Result<mpsc::Receiver<TransportEvent>, TransportFault>;

    /// Tear down the connection and the active subscription.
    async fn disconnect(&mut self);
}

/// Notification published on the test-result channel.
///
/// Transient; decoded, correlated, and dropped. An error payload aborts the
/// subscription instead of being delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    /// Record the event pertains to.
    pub sobject: PushSubject,

    /// Error payload short-circuiting delivery, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Subject of a push notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSubject {
    /// Run id of the subject.
    #[serde(rename = "Id")]
    pub id: String,
}

impl PushMessage {
    /// Decode a raw channel payload. Returns `None` when the payload does
    /// not have the expected shape.
    pub fn decode(payload: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(payload.clone()).ok()
    }

    /// Run id the event pertains to.
    pub fn subject_id(&self) -> &str {
        &self.sobject.id
    }
}
