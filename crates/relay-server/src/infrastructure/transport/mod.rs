//! Transport seams between the relay core and the wire.
//!
//! The application layer never touches a WebSocket directly.  Each accepted
//! client is split into two halves:
//!
//! - a [`MessageSink`] (write half), owned by the client's
//!   [`Connection`](crate::application::Connection) behind its write lock, and
//! - a [`MessageSource`] (read half), owned by the client's read loop.
//!
//! # Testability
//!
//! The production implementation wraps axum's `WebSocket` (see
//! [`websocket`]); tests use the in-memory doubles in [`mock`] or the
//! `mockall`-generated `MockMessageSink`.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod mock;
pub mod websocket;

/// Error type for transport operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The peer closed the channel, or it was already closed locally.
    #[error("connection closed")]
    Closed,

    /// A write did not complete within the configured limit.
    #[error("write timed out after {0:?}")]
    Timeout(Duration),

    /// Any other WebSocket protocol or I/O failure.
    #[error("websocket error: {0}")]
    WebSocket(String),
}

impl TransportError {
    /// Returns `true` when the peer went away rather than the transport
    /// failing.
    ///
    /// The read loop uses this to tell a disconnect from a read error; both
    /// end the connection.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, TransportError::Closed)
    }
}

/// Write half of a client channel.
///
/// Implementations need not be internally synchronised: the caller guarantees
/// at most one call is in flight at a time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSink: Send {
    /// Sends one text message to the client.
    async fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Closes the channel.  Errors are swallowed; a failed close still
    /// counts as closed.
    async fn close(&mut self);
}

/// Read half of a client channel.
#[async_trait]
pub trait MessageSource: Send {
    /// Waits for the next data message and returns its raw payload.
    ///
    /// Control traffic (ping/pong) is handled below this interface and never
    /// surfaces here.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] when the peer has gone away and any
    /// other variant on a transport failure.  Either way the channel is
    /// finished; callers must not read again.
    async fn next_payload(&mut self) -> Result<Vec<u8>, TransportError>;
}
