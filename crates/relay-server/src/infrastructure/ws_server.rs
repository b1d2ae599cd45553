//! Relay server: HTTP routes, WebSocket upgrade, and per-connection tasks.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Routing requests with an axum [`Router`]: `GET /` answers the health
//!    check, `GET <ws_path>` upgrades to a WebSocket, anything else gets a
//!    JSON 404 (or 405 for a known path with the wrong method).
//! 3. Splitting each upgraded WebSocket into sink/source halves and running
//!    the relay's read loop for it in the task axum spawns for the upgrade.
//! 4. Stopping the listener when the `running` flag is cleared.
//!
//! # Scalability
//!
//! Each client runs in its own Tokio task.  Broadcasts run inside the sending
//! client's task, so fan-out happens concurrently across senders rather than
//! through a central dispatcher.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use relay_core::ConnectionId;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tracing::{debug, info, warn};

use crate::application::{run_connection, BroadcastRelay, Connection, ConnectionRegistry};
use crate::domain::config::RelayConfig;
use crate::domain::messages::{ErrorResponse, HealthResponse, UPGRADE_FAILED};
use crate::infrastructure::transport::websocket::split_websocket;

/// How often the shutdown watcher checks the `running` flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// Shared state handed to every axum handler.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<BroadcastRelay>,
    pub config: Arc<RelayConfig>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds the listener and serves clients until `running` is set to `false`.
///
/// `registry` is the process-wide connection registry, created by the caller
/// at startup.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (e.g., the port is
/// already in use or the process lacks permission to bind).
pub async fn run_server(
    config: RelayConfig,
    registry: Arc<ConnectionRegistry>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind relay listener on {}", config.bind_addr))?;

    info!(
        "relay listening on {} (WebSocket path {})",
        config.bind_addr, config.ws_path
    );

    let relay = Arc::new(BroadcastRelay::new(registry, config.write_timeout));
    serve(listener, relay, Arc::new(config), running).await
}

/// Serves the relay on an already-bound listener.
///
/// Split out from [`run_server`] so tests can bind an ephemeral port and keep
/// a handle on the relay's registry.  Returns once `running` is cleared;
/// upgraded WebSocket connections are not drained.
///
/// # Errors
///
/// Returns an error if the underlying server fails while accepting.
pub async fn serve(
    listener: TcpListener,
    relay: Arc<BroadcastRelay>,
    config: Arc<RelayConfig>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let app = build_router(AppState { relay, config });

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(wait_for_stop(running))
    .await
    .context("relay server stopped with an error")?;

    info!("shutdown flag set; listener closed");
    Ok(())
}

/// Builds the router for both HTTP routes and the WebSocket route.
///
/// `config.ws_path` must start with `/` and must not be `/`.
pub fn build_router(state: AppState) -> Router {
    let ws_path = state.config.ws_path.clone();
    let request_timeout = state.config.handshake_timeout;

    Router::new()
        .route("/", get(health_handler))
        .route(&ws_path, get(ws_handler))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// GET <ws_path>
///
/// A request that cannot be upgraded is answered with
/// `400 {"error":"Failed to upgrade WebSocket"}` and never reaches the
/// registry.
async fn ws_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            warn!("WebSocket upgrade from {peer} rejected: {}", rejection.body_text());
            return upgrade_failed();
        }
    };

    let max_size = state.config.max_message_size;
    upgrade
        .max_message_size(max_size)
        .max_frame_size(max_size)
        .on_failed_upgrade(move |e| warn!("WebSocket handshake with {peer} failed: {e}"))
        .on_upgrade(move |socket| handle_socket(socket, peer, state.relay))
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not Found")))
}

fn upgrade_failed() -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(UPGRADE_FAILED))).into_response()
}

// ── Per-connection task ───────────────────────────────────────────────────────

/// Runs one upgraded client from registration to close.
async fn handle_socket(socket: WebSocket, peer: SocketAddr, relay: Arc<BroadcastRelay>) {
    info!("WebSocket client connected from {peer}");

    let (sink, source) = split_websocket(socket);
    let conn = Connection::new(ConnectionId::new(), peer, Box::new(sink));
    let exit = run_connection(&relay, conn, source).await;
    debug!("{peer} read loop exit: {exit:?}");
}

/// Resolves once `running` has been cleared.
async fn wait_for_stop(running: Arc<AtomicBool>) {
    while running.load(Ordering::Relaxed) {
        tokio::time::sleep(SHUTDOWN_POLL).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    fn make_app(ws_path: &str) -> Router {
        let config = RelayConfig {
            ws_path: ws_path.to_string(),
            ..RelayConfig::default()
        };
        let relay = Arc::new(BroadcastRelay::new(
            Arc::new(ConnectionRegistry::new()),
            config.write_timeout,
        ));
        build_router(AppState {
            relay,
            config: Arc::new(config),
        })
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 50000))))
    }

    async fn request(app: Router, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_returns_running_message() {
        let (status, body) = request(make_app("/ws"), Method::GET, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"message": "The server is running!"}));
    }

    #[tokio::test]
    async fn test_health_answers_head() {
        let (status, _) = request(make_app("/ws"), Method::HEAD, "/").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_plain_get_on_ws_path_is_upgrade_failure() {
        let (status, body) = request(make_app("/ws"), Method::GET, "/ws").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "Failed to upgrade WebSocket"}));
    }

    #[tokio::test]
    async fn test_custom_ws_path_is_routed() {
        let (status, _) = request(make_app("/chat"), Method::GET, "/chat").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = request(make_app("/chat"), Method::GET, "/ws").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let (status, body) = request(make_app("/ws"), Method::GET, "/favicon.ico").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"error": "Not Found"}));
    }

    #[tokio::test]
    async fn test_post_to_health_is_method_not_allowed() {
        let (status, _) = request(make_app("/ws"), Method::POST, "/").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_query_string_does_not_affect_routing() {
        let (status, _) = request(make_app("/ws"), Method::GET, "/?v=1").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wait_for_stop_resolves_after_flag_cleared() {
        let running = Arc::new(AtomicBool::new(true));
        let waiter = tokio::spawn(wait_for_stop(Arc::clone(&running)));

        running.store(false, Ordering::Relaxed);

        tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("watcher must notice the cleared flag")
            .unwrap();
    }
}
