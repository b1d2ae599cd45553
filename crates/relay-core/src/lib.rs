//! # relay-core
//!
//! Shared library for the realtime relay containing the wire envelope, its
//! JSON codec, and the identity type used to track live connections.
//!
//! This crate is used by the server and by any client or test harness that
//! needs to speak the relay's wire format.  It has zero dependencies on async
//! runtimes or network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! The relay is a fan-out hub: every client holds one WebSocket open to the
//! server, and whatever one client sends is forwarded to every *other*
//! connected client.  Before forwarding, the server wraps the raw payload in a
//! small JSON object called the *envelope*:
//!
//! ```json
//! {"data":"hello","isUser":false}
//! ```
//!
//! This crate defines:
//!
//! - **`protocol`** – The envelope type and the functions that turn a raw
//!   payload into the exact text frame sent to receivers (and back again, for
//!   clients and tests).
//!
//! - **`domain`** – Identity types with no I/O attached.  A
//!   [`ConnectionId`] names one live client channel for the lifetime of the
//!   process.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `relay_core::Envelope` instead of `relay_core::protocol::envelope::Envelope`.
pub use domain::identity::ConnectionId;
pub use protocol::codec::{decode_envelope, encode_envelope, ProtocolError};
pub use protocol::envelope::Envelope;
