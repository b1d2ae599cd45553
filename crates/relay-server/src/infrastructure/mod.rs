//! Infrastructure layer for relay-server.
//!
//! The infrastructure layer handles all I/O: accepting TCP connections,
//! answering plain HTTP requests, and speaking WebSocket to clients.
//!
//! # Responsibilities
//!
//! - Binding the listener and serving the axum router
//! - Routing each request to the health check or the WebSocket upgrade
//! - Performing the WebSocket handshake and framing (axum `ws`)
//! - Defining the transport seams the relay core writes to and reads from
//! - Handling the graceful shutdown signal
//!
//! # What does NOT belong here?
//!
//! - Registry membership and fan-out rules (that is the application layer)
//! - Configuration parsing (that is done in `main.rs`)

pub mod transport;
pub mod ws_server;

pub use ws_server::{build_router, run_server, serve, AppState};
