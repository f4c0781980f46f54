//! Subscription lifecycle management.
//!
//! Owns transport setup (auth header injection, timeouts, fault
//! translation), the handshake sequence, the subscribe/start-action
//! ordering, the inbound dispatch loop, and teardown.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use runtrack_core::{Progress, ProgressEvent, ProgressSink, QueueItem, RunId, SessionId};

use crate::api::RunApi;
use crate::config::{ClientConfig, ConnectionDescriptor};
use crate::error::{BoxError, TrackerError};
use crate::poller::CompletionPoller;
use crate::reconciler::{EventReconciler, Reconciled};
use crate::signal::{RunIdSignal, RunIdWaiter};
use crate::transport::{PushMessage, StreamingTransport, TransportEvent};

/// Result of a resolved subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Run the subscription tracked.
    pub run_id: RunId,

    /// Terminal queue state that resolved it.
    pub queue_item: QueueItem,
}

/// Lifecycle stage of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Created,
    Handshaken,
}

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Stage::Created => "created",
            Stage::Handshaken => "handshaken",
        }
    }
}

/// Tracks one asynchronous test run to completion over a push channel.
///
/// The transport connection and its single channel subscription are owned
/// exclusively by this client for the lifetime of one tracking operation;
/// one instance tracks one run.
pub struct StreamClient<T: StreamingTransport> {
    descriptor: ConnectionDescriptor,
    config: ClientConfig,
    transport: T,
    api: Arc<dyn RunApi>,
    progress: Progress,
    signal: RunIdSignal,
    waiter: RunIdWaiter,
    session_id: SessionId,
    stage: Stage,
}

impl<T: StreamingTransport> StreamClient<T> {
    /// Create a client against `descriptor`.
    pub fn new(descriptor: ConnectionDescriptor, transport: T, api: Arc<dyn RunApi>) -> Self {
        let (signal, waiter) = RunIdSignal::new();
        Self {
            descriptor,
            config: ClientConfig::default(),
            transport,
            api,
            progress: Progress::disabled(),
            signal,
            waiter,
            session_id: SessionId::generate(),
            stage: Stage::Created,
        }
    }

    /// Override the default configuration.
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a progress sink.
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Progress::new(sink);
        self
    }

    /// Handle observing the run id as soon as the start action resolves,
    /// independent of the completion result. May be taken and parked before
    /// [`subscribe`](Self::subscribe) is called.
    pub fn run_id_waiter(&self) -> RunIdWaiter {
        self.waiter.clone()
    }

    /// Authenticate and perform the transport handshake.
    ///
    /// The credential is refreshed on every call because tokens can expire
    /// silently between client construction and use.
    pub async fn handshake(&mut self) -> Result<(), TrackerError> {
        let token = self
            .api
            .refresh_credential(&self.descriptor)
            .await?
            .ok_or(TrackerError::NoAccessToken)?;
        self.transport.set_auth_header(&token.bearer_header());

        let url = self.streaming_url();
        info!(session_id = %self.session_id, url = %url, "Connecting push transport");
        self.transport
            .connect(&url, self.config.connect_timeout)
            .await
            .map_err(|fault| TrackerError::HandshakeFailed(fault.to_string()))?;

        if let Err(fault) = self.transport.handshake().await {
            self.transport.disconnect().await;
            return Err(TrackerError::HandshakeFailed(fault.to_string()));
        }

        self.stage = Stage::Handshaken;
        debug!(session_id = %self.session_id, "Transport handshake complete");
        Ok(())
    }

    /// Subscribe to the result channel, start the run, and track it until
    /// the first terminal queue state.
    ///
    /// The channel subscription is established before `start_action` is
    /// invoked, so no event for the newly started run is missed. The run id
    /// resolved by `start_action` becomes the session's id and resolves the
    /// run id signal. The first terminal queue state tears the channel down
    /// and resolves the operation.
    pub async fn subscribe<F, Fut>(&mut self, start_action: F) -> Result<RunOutcome, TrackerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RunId, BoxError>> + Send + 'static,
    {
        if self.stage != Stage::Handshaken {
            return Err(TrackerError::InvalidState {
                expected: Stage::Handshaken.name(),
                actual: self.stage.name(),
            });
        }

        let inbound = match self.transport.subscribe(&self.config.channel).await {
            Ok(rx) => rx,
            Err(fault) => {
                self.transport.disconnect().await;
                self.stage = Stage::Created;
                return Err(TrackerError::Transport(fault.to_string()));
            }
        };
        info!(
            session_id = %self.session_id,
            channel = %self.config.channel,
            "Subscribed to result channel, starting run"
        );

        let mut start_task = tokio::spawn(start_action());
        let started_at = Utc::now();

        let ceiling = self.config.subscribe_timeout;
        let result =
            match tokio::time::timeout(ceiling, self.dispatch(inbound, &mut start_task)).await {
                Ok(result) => result,
                Err(_) => Err(TrackerError::IdleTimeout(ceiling)),
            };

        start_task.abort();
        self.transport.disconnect().await;
        self.stage = Stage::Created;

        match &result {
            Ok(outcome) => {
                let elapsed = Utc::now().signed_duration_since(started_at);
                info!(
                    session_id = %self.session_id,
                    run_id = %outcome.run_id,
                    elapsed_ms = elapsed.num_milliseconds(),
                    "Run resolved"
                );
            }
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "Subscription aborted");
            }
        }
        result
    }

    /// Dispatch loop: races the start action against inbound events until
    /// the first terminal outcome or failure. Polls are issued inline, so
    /// at most one is in flight.
    async fn dispatch(
        &self,
        inbound: mpsc::Receiver<TransportEvent>,
        start_task: &mut JoinHandle<Result<RunId, BoxError>>,
    ) -> Result<RunOutcome, TrackerError> {
        let poller = CompletionPoller::new(self.api.clone(), self.progress.clone());
        let reconciler = EventReconciler::new(poller, self.progress.clone());
        let mut inbound = ReceiverStream::new(inbound);
        let mut started = false;

        loop {
            tokio::select! {
                resolved = &mut *start_task, if !started => {
                    started = true;
                    let run_id = match resolved {
                        Ok(Ok(run_id)) => run_id,
                        Ok(Err(err)) => return Err(TrackerError::SubscriptionSetup(err)),
                        Err(join_err) => {
                            return Err(TrackerError::SubscriptionSetup(Box::new(join_err)));
                        }
                    };
                    info!(session_id = %self.session_id, run_id = %run_id, "Run started");
                    self.signal.resolve(run_id);
                }
                event = inbound.next() => {
                    let Some(event) = event else {
                        return Err(TrackerError::Transport(
                            "push channel closed before completion".to_string(),
                        ));
                    };
                    if let Some(outcome) = self.handle_event(&reconciler, event).await? {
                        return Ok(outcome);
                    }
                }
            }
        }
    }

    async fn handle_event(
        &self,
        reconciler: &EventReconciler,
        event: TransportEvent,
    ) -> Result<Option<RunOutcome>, TrackerError> {
        match event {
            TransportEvent::Up => {
                debug!(session_id = %self.session_id, "Transport up");
                self.progress.report(ProgressEvent::TransportUp);
                Ok(None)
            }
            TransportEvent::Down => {
                debug!(session_id = %self.session_id, "Transport down");
                self.progress.report(ProgressEvent::TransportDown);
                Ok(None)
            }
            TransportEvent::Error(detail) => Err(TrackerError::Transport(detail)),
            TransportEvent::Message(payload) => {
                let Some(message) = PushMessage::decode(&payload) else {
                    warn!(session_id = %self.session_id, "Dropping undecodable push payload");
                    return Ok(None);
                };
                if let Some(detail) = message.error {
                    return Err(TrackerError::Transport(detail));
                }

                let subscribed = self.signal.get();
                match reconciler
                    .reconcile(message.subject_id(), subscribed.as_ref())
                    .await?
                {
                    Reconciled::Terminal { run_id, queue_item } => {
                        // Covers a terminal event arriving before the start
                        // action has resolved; first write wins.
                        self.signal.resolve(run_id.clone());
                        Ok(Some(RunOutcome { run_id, queue_item }))
                    }
                    Reconciled::Pending => Ok(None),
                }
            }
        }
    }

    fn streaming_url(&self) -> String {
        format!(
            "{}/cometd/{}",
            self.descriptor.instance_url.trim_end_matches('/'),
            self.config.api_version
        )
    }
}
