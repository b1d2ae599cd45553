//! One live client channel as seen by the relay core.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use relay_core::ConnectionId;
use tokio::sync::{watch, Mutex};
use tokio::time::timeout;
use tracing::debug;

use crate::infrastructure::transport::{MessageSink, TransportError};

/// Upper bound on how long closing a sink may take.
///
/// Closing sends a Close frame; a peer that stopped reading must not pin the
/// closing task forever.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// A registered client channel.
///
/// Holds the write half of the transport behind a per-connection async
/// mutex, so two broadcasts targeting the same client never interleave their
/// writes.  The read half is not stored here; it belongs to the client's
/// read loop.
///
/// # Close semantics
///
/// [`close`](Self::close) takes the sink out of the lock, so the first call
/// wins and every later call (and every later write) is a cheap no-op or a
/// [`TransportError::Closed`].  Closing also raises a signal that the read
/// loop watches via [`closed`](Self::closed).
pub struct Connection {
    id: ConnectionId,
    peer: SocketAddr,
    writer: Mutex<Option<Box<dyn MessageSink>>>,
    closed_tx: watch::Sender<bool>,
}

impl Connection {
    /// Wraps a freshly accepted client's write half.
    pub fn new(id: ConnectionId, peer: SocketAddr, sink: Box<dyn MessageSink>) -> Arc<Self> {
        let (closed_tx, _) = watch::channel(false);
        Arc::new(Self {
            id,
            peer,
            writer: Mutex::new(Some(sink)),
            closed_tx,
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Writes one text message while holding this connection's write lock.
    ///
    /// With `limit` set, a write that has not completed in time is abandoned
    /// and reported as [`TransportError::Timeout`].
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] if the connection was already
    /// closed, otherwise whatever the sink reported.
    pub async fn send_text(
        &self,
        text: &str,
        limit: Option<Duration>,
    ) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        let sink = writer.as_mut().ok_or(TransportError::Closed)?;
        match limit {
            Some(limit) => timeout(limit, sink.send_text(text))
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => sink.send_text(text).await,
        }
    }

    /// Closes the transport.  Idempotent.
    ///
    /// Returns `true` if this call performed the close.
    pub async fn close(&self) -> bool {
        let sink = self.writer.lock().await.take();
        let performed = match sink {
            Some(mut sink) => {
                if timeout(CLOSE_TIMEOUT, sink.close()).await.is_err() {
                    debug!("close of {} timed out; dropping transport", self.peer);
                }
                true
            }
            None => false,
        };
        self.closed_tx.send_replace(true);
        performed
    }

    pub fn is_closed(&self) -> bool {
        *self.closed_tx.borrow()
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub async fn closed(&self) {
        let mut rx = self.closed_tx.subscribe();
        // The sender lives in `self`, so `wait_for` cannot observe it dropped.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
