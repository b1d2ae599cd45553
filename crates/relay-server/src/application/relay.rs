//! BroadcastRelay: fan-out of one sender's message to every other client.
//!
//! # Algorithm
//!
//! ```text
//! broadcast(sender, payload)
//!   1. text = encode({data: payload-as-text, isUser: false})   ─ abort on error
//!   2. peers = registry.snapshot_excluding(sender)              ─ read lock, no I/O
//!   3. for each peer (sequentially, any order):
//!        peer.send_text(text)          ─ per-connection write lock
//!        on failure: unregister(peer); close(peer); keep going
//! ```
//!
//! Delivery is best-effort and fire-and-forget: the sender is never told
//! whether anyone received its message.  A failing recipient costs only
//! itself; the remaining recipients in the snapshot are still served.
//!
//! # Head-of-line blocking
//!
//! Writes are sequential within one broadcast, so a slow recipient delays
//! the ones after it.  `write_timeout` bounds that delay: a write that does
//! not finish in time is treated as a failed write and the recipient is
//! evicted.

use std::sync::Arc;
use std::time::Duration;

use relay_core::{encode_envelope, ConnectionId, Envelope, ProtocolError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::registry::ConnectionRegistry;

/// Errors that abort a single broadcast.
#[derive(Debug, Error, PartialEq)]
pub enum RelayError {
    /// The envelope could not be encoded; nobody receives this message.
    #[error(transparent)]
    Encode(#[from] ProtocolError),
}

/// Outcome of one broadcast, for logging and tests.
///
/// Never sent back to the sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients whose write succeeded.
    pub delivered: usize,
    /// Recipients whose write failed and who were evicted.
    pub evicted: usize,
}

/// Delivers messages to every registered connection except the sender.
pub struct BroadcastRelay {
    registry: Arc<ConnectionRegistry>,
    write_timeout: Option<Duration>,
}

impl BroadcastRelay {
    /// Creates a relay over `registry`.
    ///
    /// `write_timeout` of `None` lets a write block for as long as the
    /// transport does.
    pub fn new(registry: Arc<ConnectionRegistry>, write_timeout: Option<Duration>) -> Self {
        Self {
            registry,
            write_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Wraps `payload` in the envelope and writes it to every other client.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Encode`] if the envelope cannot be encoded.  In
    /// that case nothing is written and nobody is evicted.
    pub async fn broadcast(
        &self,
        sender: ConnectionId,
        payload: &[u8],
    ) -> Result<BroadcastReport, RelayError> {
        let text = encode_envelope(&Envelope::relayed(payload))?;
        let recipients = self.registry.snapshot_excluding(sender).await;

        let mut report = BroadcastReport::default();
        for conn in recipients {
            match conn.send_text(&text, self.write_timeout).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("error broadcasting to client {}: {e}", conn.peer());
                    self.registry.unregister(conn.id()).await;
                    conn.close().await;
                    report.evicted += 1;
                }
            }
        }

        debug!(
            "broadcast from {sender}: delivered={}, evicted={}",
            report.delivered, report.evicted
        );
        Ok(report)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
