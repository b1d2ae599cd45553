//! relay-server library crate.
//!
//! This crate provides a realtime message relay: clients hold a WebSocket
//! open, and anything one client sends is forwarded to every other client.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Clients (WebSocket text/binary frames)
//!         ↕
//! [relay-server]
//!   ├── domain/           Pure types: RelayConfig, HTTP JSON bodies
//!   ├── application/      Relay core: registry, broadcast, read loop
//!   └── infrastructure/
//!         ├── transport/  Sink/source seams + axum WebSocket adapters
//!         └── ws_server/  axum router, upgrade handler, per-connection tasks
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O, no async, no frameworks.
//! - `application` depends on `domain`, `relay-core`, and the transport
//!   traits only; it never names a socket or a WebSocket type.
//! - `infrastructure` depends on all other layers plus `axum`.

/// Domain layer: configuration and HTTP body types (no I/O).
pub mod domain;

/// Application layer: connection registry and broadcast relay.
pub mod application;

/// Infrastructure layer: listener, routing, and WebSocket transport.
pub mod infrastructure;
