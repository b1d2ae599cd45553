//! Realtime relay server entry point.
//!
//! This binary accepts WebSocket connections and forwards every message a
//! client sends to all other connected clients, wrapped in a small JSON
//! envelope.  The same port also answers a plain `GET /` health check.
//!
//! # Usage
//!
//! ```text
//! relay-server [OPTIONS]
//!
//! Options:
//!   --port              <PORT>   Listener port [default: 8080]
//!   --bind              <IP>     Listener address [default: 0.0.0.0]
//!   --ws-path           <PATH>   WebSocket route [default: /ws]
//!   --write-timeout     <SECS>   Per-recipient write limit, 0 = none [default: 10]
//!   --handshake-timeout <SECS>   HTTP request handling limit [default: 10]
//!   --max-message-size  <BYTES>  Largest inbound message [default: 65536]
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable                  | Default   |
//! |---------------------------|-----------|
//! | `RELAY_PORT`              | `8080`    |
//! | `RELAY_BIND`              | `0.0.0.0` |
//! | `RELAY_WS_PATH`           | `/ws`     |
//! | `RELAY_WRITE_TIMEOUT`     | `10`      |
//! | `RELAY_HANDSHAKE_TIMEOUT` | `10`      |
//! | `RELAY_MAX_MESSAGE_SIZE`  | `65536`   |
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relay_server::application::ConnectionRegistry;
use relay_server::domain::config::{DEFAULT_PORT, DEFAULT_WS_PATH};
use relay_server::domain::RelayConfig;
use relay_server::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Realtime WebSocket message relay.
///
/// Every message a client sends is forwarded to all other connected clients.
#[derive(Debug, Parser)]
#[command(
    name = "relay-server",
    about = "Realtime WebSocket message relay",
    version
)]
struct Cli {
    /// TCP port for both the health check and the WebSocket route.
    #[arg(long, default_value_t = DEFAULT_PORT, env = "RELAY_PORT")]
    port: u16,

    /// IP address to bind to.
    ///
    /// Use `0.0.0.0` to accept connections on every interface, or `127.0.0.1`
    /// for local connections only.
    #[arg(long, default_value = "0.0.0.0", env = "RELAY_BIND")]
    bind: String,

    /// Request path that upgrades to a WebSocket.
    #[arg(long, default_value = DEFAULT_WS_PATH, env = "RELAY_WS_PATH")]
    ws_path: String,

    /// Seconds a single write to one recipient may take before that
    /// recipient is evicted.  `0` disables the limit.
    #[arg(long, default_value_t = 10, env = "RELAY_WRITE_TIMEOUT")]
    write_timeout: u64,

    /// Seconds the server may spend answering one HTTP request, including the
    /// `101 Switching Protocols` reply to an upgrade.
    #[arg(long, default_value_t = 10, env = "RELAY_HANDSHAKE_TIMEOUT")]
    handshake_timeout: u64,

    /// Largest inbound WebSocket message accepted, in bytes.
    #[arg(long, default_value_t = 64 * 1024, env = "RELAY_MAX_MESSAGE_SIZE")]
    max_message_size: usize,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`RelayConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--bind` is not a valid IP address or `--ws-path`
    /// does not start with `/`.
    fn into_relay_config(self) -> anyhow::Result<RelayConfig> {
        let bind_addr: SocketAddr = format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("invalid bind address: '{}:{}'", self.bind, self.port))?;

        if !self.ws_path.starts_with('/') {
            anyhow::bail!("--ws-path must start with '/': '{}'", self.ws_path);
        }
        if self.ws_path == "/" {
            anyhow::bail!("--ws-path cannot be '/', which serves the health check");
        }

        let write_timeout = match self.write_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(RelayConfig {
            bind_addr,
            ws_path: self.ws_path,
            write_timeout,
            handshake_timeout: Duration::from_secs(self.handshake_timeout),
            max_message_size: self.max_message_size,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. `tracing_subscriber` is initialised; `RUST_LOG` sets the level.
/// 2. CLI arguments are parsed into a [`RelayConfig`].
/// 3. The process-wide [`ConnectionRegistry`] is created.  It lives until
///    the process exits.
/// 4. A Ctrl+C handler clears a shared `AtomicBool`.
/// 5. [`run_server`] accepts clients until the flag is cleared.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_relay_config()?;

    info!(
        "realtime relay starting: addr={}, ws_path={}",
        config.bind_addr, config.ws_path
    );

    let registry = Arc::new(ConnectionRegistry::new());

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, stopping accept loop");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, registry, running).await?;

    info!("realtime relay stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
