//! Scripted collaborator doubles shared by module tests.

use async_trait::async_trait;
use runtrack_core::{ProgressEvent, ProgressSink, QueueRecord};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::api::{AccessToken, ApiError, RunApi};
use crate::config::ConnectionDescriptor;
use crate::transport::{StreamingTransport, TransportEvent, TransportFault};

/// API double returning a fixed credential and a scripted sequence of query
/// responses. Panics on an unscripted query so tests catch polls that must
/// never happen.
pub(crate) struct ScriptedApi {
    token: Option<AccessToken>,
    responses: Mutex<VecDeque<Result<Vec<QueueRecord>, ApiError>>>,
    query_count: AtomicUsize,
}

impl ScriptedApi {
    pub(crate) fn new(token: Option<AccessToken>) -> Self {
        Self {
            token,
            responses: Mutex::new(VecDeque::new()),
            query_count: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_token() -> Self {
        Self::new(Some(AccessToken::new("scripted-token")))
    }

    pub(crate) fn without_token() -> Self {
        Self::new(None)
    }

    pub(crate) fn push_response(&self, response: Result<Vec<QueueRecord>, ApiError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn queries(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RunApi for ScriptedApi {
    async fn refresh_credential(
        &self,
        _descriptor: &ConnectionDescriptor,
    ) -> Result<Option<AccessToken>, ApiError> {
        Ok(self.token.clone())
    }

    async fn query_run_queue(&self, run_id: &str) -> Result<Vec<QueueRecord>, ApiError> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted query for run {run_id}"))
    }
}

/// Observable state of a [`ScriptedTransport`], shared with the test body.
#[derive(Default)]
pub(crate) struct TransportState {
    pub(crate) disconnects: AtomicUsize,
    pub(crate) auth_headers: Mutex<Vec<String>>,
    pub(crate) subscribed_channels: Mutex<Vec<String>>,
    pub(crate) connected_urls: Mutex<Vec<String>>,
}

impl TransportState {
    pub(crate) fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

/// Transport double delivering a preloaded event script on subscribe.
///
/// The sender side of the event channel is retained so the stream stays
/// open after the script drains.
pub(crate) struct ScriptedTransport {
    events: Vec<TransportEvent>,
    handshake_fault: Option<String>,
    // Keeps the event channel open after the script drains.
    _tx: Option<mpsc::Sender<TransportEvent>>,
    pub(crate) state: Arc<TransportState>,
}

impl ScriptedTransport {
    pub(crate) fn new(events: Vec<TransportEvent>) -> Self {
        Self {
            events,
            handshake_fault: None,
            _tx: None,
            state: Arc::new(TransportState::default()),
        }
    }

    pub(crate) fn failing_handshake(detail: impl Into<String>) -> Self {
        Self {
            events: Vec::new(),
            handshake_fault: Some(detail.into()),
            _tx: None,
            state: Arc::new(TransportState::default()),
        }
    }
}

#[async_trait]
impl StreamingTransport for ScriptedTransport {
    fn set_auth_header(&mut self, header: &str) {
        self.state.auth_headers.lock().unwrap().push(header.to_string());
    }

    async fn connect(&mut self, url: &str, _timeout: Duration) -> Result<(), TransportFault> {
        self.state.connected_urls.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn handshake(&mut self) -> Result<(), TransportFault> {
        match self.handshake_fault.take() {
            Some(detail) => Err(TransportFault::new(detail)),
            None => Ok(()),
        }
    }

    async fn subscribe(
        &mut self,
        channel: &str,
    ) -> Result<mpsc::Receiver<TransportEvent>, TransportFault> {
        self.state
            .subscribed_channels
            .lock()
            .unwrap()
            .push(channel.to_string());

        let (tx, rx) = mpsc::channel(64);
        for event in self.events.drain(..) {
            tx.try_send(event)
                .map_err(|_| TransportFault::new("script overflow"))?;
        }
        self._tx = Some(tx);
        Ok(rx)
    }

    async fn disconnect(&mut self) {
        self.state.disconnects.fetch_add(1, Ordering::SeqCst);
        self._tx = None;
    }
}

/// Progress sink collecting every event for assertions.
#[derive(Default)]
pub(crate) struct CollectingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingSink {
    pub(crate) fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn snapshot_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::QueueSnapshot { .. }))
            .count()
    }

    pub(crate) fn processing_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::RunProcessing { .. }))
            .count()
    }
}

impl ProgressSink for CollectingSink {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}
