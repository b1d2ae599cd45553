//! Application layer for relay-server.
//!
//! The application layer is the relay core: it knows *what* to do with
//! connections and messages, but delegates *how* bytes move to the
//! infrastructure layer's transport traits.
//!
//! # Responsibilities
//!
//! - Tracking live connections ([`ConnectionRegistry`])
//! - Serialising writes to each connection ([`Connection`])
//! - Fanning a message out to every other client ([`BroadcastRelay`])
//! - Driving each connection's read loop ([`run_connection`])
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or listening for connections (that is infrastructure)
//! - HTTP routing and the WebSocket handshake
//! - WebSocket framing (handled by axum)

pub mod connection;
pub mod registry;
pub mod relay;
pub mod session;

pub use connection::Connection;
pub use registry::ConnectionRegistry;
pub use relay::{BroadcastRelay, BroadcastReport, RelayError};
pub use session::{run_connection, ReadLoopExit};
