//! Relay configuration types.
//!
//! [`RelayConfig`] is the single source of truth for all runtime settings.
//! It can be constructed from CLI arguments (preferred for production) or from
//! sensible defaults (useful for local development and tests).
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! variable reads inside the domain) makes the relay easy to embed in tests.
//! `main.rs` is responsible for populating it from CLI args or environment
//! variables.

use std::net::SocketAddr;
use std::time::Duration;

/// Default listening port, shared by the health route and the WebSocket route.
pub const DEFAULT_PORT: u16 = 8080;

/// Default path of the WebSocket upgrade route.
pub const DEFAULT_WS_PATH: &str = "/ws";

/// All runtime configuration for the relay server.
///
/// Build this struct once at startup and then wrap it in an `Arc` so it can be
/// shared cheaply across all connection tasks.
///
/// # Example
///
/// ```rust
/// use relay_server::domain::RelayConfig;
///
/// let cfg = RelayConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 8080);
/// assert_eq!(cfg.ws_path, "/ws");
/// ```
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// The address and port the server binds to.
    ///
    /// `0.0.0.0` accepts connections from any network interface.
    pub bind_addr: SocketAddr,

    /// Request path that upgrades to a WebSocket.  Must start with `/`.
    pub ws_path: String,

    /// Upper bound on a single write to one recipient during a broadcast.
    ///
    /// A write that exceeds it counts as failed and the recipient is evicted.
    /// `None` disables the bound.
    pub write_timeout: Option<Duration>,

    /// Upper bound on answering one HTTP request, including the reply that
    /// accepts a WebSocket upgrade.  A request that runs over gets `408`.
    pub handshake_timeout: Duration,

    /// Largest inbound WebSocket message accepted, in bytes.
    pub max_message_size: usize,
}

impl Default for RelayConfig {
    /// | Field              | Default        |
    /// |--------------------|----------------|
    /// | bind_addr          | `0.0.0.0:8080` |
    /// | ws_path            | `/ws`          |
    /// | write_timeout      | 10 seconds     |
    /// | handshake_timeout  | 10 seconds     |
    /// | max_message_size   | 64 KiB         |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            ws_path: DEFAULT_WS_PATH.to_string(),
            write_timeout: Some(Duration::from_secs(10)),
            handshake_timeout: Duration::from_secs(10),
            max_message_size: 64 * 1024,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
