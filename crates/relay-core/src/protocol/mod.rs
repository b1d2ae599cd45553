//! Protocol module containing the wire envelope and its JSON codec.

pub mod codec;
pub mod envelope;

pub use codec::{decode_envelope, encode_envelope, ProtocolError};
pub use envelope::Envelope;
