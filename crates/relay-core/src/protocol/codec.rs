//! JSON codec for the relay envelope.
//!
//! Wire format (one WebSocket text frame per envelope):
//! ```text
//! {"data":"<payload as text>","isUser":false}
//! ```
//! No trailing newline, no pretty-printing.

use thiserror::Error;
use tracing::trace;

use crate::protocol::envelope::Envelope;

/// Errors that can occur during envelope encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The envelope could not be serialized.
    #[error("failed to encode envelope: {0}")]
    Encode(String),

    /// The text is not a well-formed envelope.
    #[error("malformed envelope: {0}")]
    Decode(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`Envelope`] into the exact text sent to receivers.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use relay_core::{encode_envelope, Envelope};
///
/// let text = encode_envelope(&Envelope::relayed(b"hello")).unwrap();
/// assert_eq!(text, r#"{"data":"hello","isUser":false}"#);
/// ```
pub fn encode_envelope(envelope: &Envelope) -> Result<String, ProtocolError> {
    let text =
        serde_json::to_string(envelope).map_err(|e| ProtocolError::Encode(e.to_string()))?;
    trace!(len = text.len(), "encoded envelope");
    Ok(text)
}

/// Decodes an [`Envelope`] from a received text frame.
///
/// The server never decodes envelopes; this is for clients and test
/// harnesses that consume the relay's output.
///
/// # Errors
///
/// Returns [`ProtocolError::Decode`] if `text` is not a JSON object with a
/// string `data` field and a boolean `isUser` field.
pub fn decode_envelope(text: &str) -> Result<Envelope, ProtocolError> {
    serde_json::from_str(text).map_err(|e| ProtocolError::Decode(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
