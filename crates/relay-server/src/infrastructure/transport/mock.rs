//! In-memory transport doubles for testing.
//!
//! Allows tests to drive the relay core without sockets: a
//! [`RecordingSink`] captures every text written to a client, and a
//! [`ScriptedSource`] yields whatever payloads (or errors) the test feeds it.
//! Each double comes with a handle ([`SinkTap`], [`SourceFeed`]) that the
//! test keeps after the double itself has been moved into a connection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{MessageSink, MessageSource, TransportError};

#[derive(Default)]
struct SinkState {
    sent: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
    stall_writes: AtomicBool,
    close_calls: AtomicUsize,
}

/// A [`MessageSink`] that records every text it is asked to send.
pub struct RecordingSink {
    state: Arc<SinkState>,
}

/// Test-side handle onto a [`RecordingSink`].
#[derive(Clone)]
pub struct SinkTap {
    state: Arc<SinkState>,
}

/// Creates a recording sink together with its tap.
pub fn recording_sink() -> (RecordingSink, SinkTap) {
    let state = Arc::new(SinkState::default());
    (
        RecordingSink {
            state: Arc::clone(&state),
        },
        SinkTap { state },
    )
}

impl SinkTap {
    /// Returns all texts successfully written so far, in write order.
    pub fn sent(&self) -> Vec<String> {
        self.state.sent.lock().expect("lock poisoned").clone()
    }

    /// Makes every subsequent write fail with a transport error.
    pub fn fail_writes(&self) {
        self.state.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Makes every subsequent write hang forever, simulating an unresponsive
    /// peer.
    pub fn stall_writes(&self) {
        self.state.stall_writes.store(true, Ordering::SeqCst);
    }

    /// Returns how many times `close` was called on the sink.
    pub fn close_calls(&self) -> usize {
        self.state.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        if self.state.stall_writes.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.state.fail_writes.load(Ordering::SeqCst) {
            return Err(TransportError::WebSocket("injected write failure".to_string()));
        }
        self.state
            .sent
            .lock()
            .expect("lock poisoned")
            .push(text.to_string());
        Ok(())
    }

    async fn close(&mut self) {
        self.state.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// A [`MessageSource`] fed by the test through a [`SourceFeed`].
///
/// Once the feed is dropped and all queued items are consumed, the source
/// reports [`TransportError::Closed`], like a peer that hung up.
pub struct ScriptedSource {
    rx: mpsc::UnboundedReceiver<Result<Vec<u8>, TransportError>>,
}

/// Test-side handle that pushes inbound traffic into a [`ScriptedSource`].
#[derive(Clone)]
pub struct SourceFeed {
    tx: mpsc::UnboundedSender<Result<Vec<u8>, TransportError>>,
}

/// Creates a scripted source together with its feed.
pub fn scripted_source() -> (ScriptedSource, SourceFeed) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ScriptedSource { rx }, SourceFeed { tx })
}

impl SourceFeed {
    /// Queues one inbound payload, as if the client had sent it.
    pub fn push(&self, payload: impl Into<Vec<u8>>) {
        // The source may already be gone if its read loop ended; that is fine.
        let _ = self.tx.send(Ok(payload.into()));
    }

    /// Queues a read failure.
    pub fn fail(&self, err: TransportError) {
        let _ = self.tx.send(Err(err));
    }
}

#[async_trait]
impl MessageSource for ScriptedSource {
    async fn next_payload(&mut self) -> Result<Vec<u8>, TransportError> {
        self.rx.recv().await.unwrap_or(Err(TransportError::Closed))
    }
}
