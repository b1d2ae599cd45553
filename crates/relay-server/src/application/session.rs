//! Per-connection read loop.
//!
//! # State machine
//!
//! ```text
//! Connected ──register──► Reading ──payload──► broadcast ──► Reading
//!                            │
//!                            ├── read failure (peer closed / transport error)
//!                            └── closed signal (evicted by a failed write)
//!                                      │
//!                                      ▼
//!                                   Closing ── unregister, close ──► done
//! ```
//!
//! A read failure is never retried.  Because the loop broadcasts one message
//! completely before reading the next, messages from one sender reach each
//! recipient in the order they were sent.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::connection::Connection;
use crate::application::relay::BroadcastRelay;
use crate::infrastructure::transport::{MessageSource, TransportError};

/// Why a read loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLoopExit {
    /// The peer closed the channel (close frame, reset, or end of stream).
    PeerClosed,
    /// Reading failed with a transport error.
    ReadError(TransportError),
    /// The connection was closed from elsewhere, typically by a broadcast
    /// whose write to this client failed.
    Evicted,
}

/// Drives one connection from registration to final close.
///
/// Registers `conn`, relays every inbound payload to the other clients, and
/// on exit unregisters and closes the connection.  Returns why the loop
/// ended.
pub async fn run_connection<S>(
    relay: &BroadcastRelay,
    conn: Arc<Connection>,
    mut source: S,
) -> ReadLoopExit
where
    S: MessageSource,
{
    let peer = conn.peer();
    relay.registry().register(Arc::clone(&conn)).await;

    let exit = loop {
        let next = tokio::select! {
            biased;
            _ = conn.closed() => break ReadLoopExit::Evicted,
            next = source.next_payload() => next,
        };

        match next {
            Ok(payload) => {
                debug!("message received from {peer} ({} bytes)", payload.len());
                if let Err(e) = relay.broadcast(conn.id(), &payload).await {
                    // Only this message is lost; keep reading.
                    error!("dropping message from {peer}: {e}");
                }
            }
            Err(e) if e.is_disconnect() => break ReadLoopExit::PeerClosed,
            Err(e) => break ReadLoopExit::ReadError(e),
        }
    };

    match &exit {
        ReadLoopExit::PeerClosed => info!("client {peer} disconnected"),
        ReadLoopExit::ReadError(e) => warn!("read error from {peer}: {e}"),
        ReadLoopExit::Evicted => debug!("client {peer} was evicted"),
    }

    relay.registry().unregister(conn.id()).await;
    conn.close().await;
    info!("WebSocket handler for {peer} ended");

    exit
}

// ── Tests ─────────────────────────────────────────────────────────────────────
