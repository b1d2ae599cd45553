//! The envelope wrapped around every server-relayed message.
//!
//! Receivers never see a sender's raw frame.  The server re-expresses the
//! payload as text and tags it so that a client UI can tell relayed messages
//! apart from the ones its own user typed:
//!
//! ```json
//! {"data":"<original payload as text>","isUser":false}
//! ```
//!
//! # Field naming
//!
//! The wire uses camelCase (`isUser`); serde's `rename` keeps the Rust field
//! snake_case.

use serde::{Deserialize, Serialize};

/// A relayed message as it appears on the wire.
///
/// Field order is significant only for readability of captured traffic:
/// serde emits fields in declaration order, so encoded envelopes always read
/// `{"data":...,"isUser":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// The sender's payload re-expressed as text.
    pub data: String,

    /// `true` only for messages that originated from the local user.
    ///
    /// The server never sets this; it is reserved for the client side, which
    /// renders its own echo with `isUser = true`.
    #[serde(rename = "isUser")]
    pub is_user: bool,
}

impl Envelope {
    /// Wraps a raw payload received from a sender for relaying to others.
    ///
    /// Valid UTF-8 is carried over unchanged.  Invalid byte sequences are
    /// replaced with U+FFFD so that the result is always a valid JSON string.
    pub fn relayed(payload: &[u8]) -> Self {
        Self {
            data: String::from_utf8_lossy(payload).into_owned(),
            is_user: false,
        }
    }
}
