//! Domain layer for relay-server.
//!
//! The domain layer contains pure types that have no dependencies on I/O,
//! networking, or async runtimes.
//!
//! # What belongs in the domain layer?
//!
//! - Configuration structures
//! - The JSON bodies of the plain-HTTP routes
//!
//! # What does NOT belong here?
//!
//! - Any `tokio`, `TcpStream`, or `WebSocket` types
//! - File I/O or environment variable reading

pub mod config;
pub mod messages;

pub use config::RelayConfig;
pub use messages::{ErrorResponse, HealthResponse};
