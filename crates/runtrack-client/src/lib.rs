//! Streaming test-run completion tracker.
//!
//! Starts an asynchronous server-side test run, subscribes to the push
//! channel carrying its result notifications, and reconciles pushed events
//! against authoritative polled queue state until every sub-task of the run
//! reaches a terminal status.
//!
//! The push transport and the remote API are consumed as collaborator
//! traits ([`StreamingTransport`], [`RunApi`]); this crate coordinates
//! their lifecycles into a single deterministic completion signal.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod poller;
pub mod reconciler;
pub mod signal;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use api::{AccessToken, ApiError, RunApi};
pub use client::{RunOutcome, StreamClient};
pub use config::{ClientConfig, ConnectionDescriptor};
pub use error::{BoxError, TrackerError};
pub use poller::{CompletionPoller, PollOutcome};
pub use reconciler::{EventReconciler, Reconciled};
pub use signal::{RunIdSignal, RunIdWaiter};
pub use transport::{
    PushMessage, PushSubject, StreamingTransport, TransportEvent, TransportFault,
};
