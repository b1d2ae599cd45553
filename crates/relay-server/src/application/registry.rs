//! ConnectionRegistry: the server-wide set of clients eligible for broadcast.
//!
//! The registry is the only state shared by every connection task.  It is
//! created once in `main`, wrapped in an `Arc`, and handed to the accept loop;
//! there is no global instance.
//!
//! # Locking (for beginners)
//!
//! Membership lives in a `HashMap` behind a single `tokio::sync::RwLock`:
//!
//! - `register` / `unregister` take the **write** lock (exclusive).
//! - `snapshot_excluding` takes the **read** lock (shared), so any number of
//!   concurrent broadcasts can enumerate at once.
//!
//! Every method copies or mutates the map and releases the lock before
//! returning.  No network I/O ever happens while the lock is held: a
//! broadcast first takes a snapshot, drops the lock, and only then writes to
//! each client.

use std::collections::HashMap;
use std::sync::Arc;

use relay_core::ConnectionId;
use tokio::sync::RwLock;
use tracing::info;

use crate::application::connection::Connection;

/// In-memory registry of live connections, keyed by [`ConnectionId`].
///
/// The registry holds an `Arc<Connection>` purely for membership; it never
/// closes a connection itself.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Arc<Connection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the active set.
    ///
    /// Registering an id that is already present replaces the entry and
    /// leaves the size unchanged.
    pub async fn register(&self, conn: Arc<Connection>) {
        let peer = conn.peer();
        let total = {
            let mut connections = self.connections.write().await;
            connections.insert(conn.id(), conn);
            connections.len()
        };
        info!("client {peer} registered; total clients: {total}");
    }

    /// Removes a connection from the active set.
    ///
    /// Absent ids are ignored, so the read loop and a failed broadcast may
    /// both unregister the same connection.  Returns `true` if an entry was
    /// removed by this call.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let (removed, total) = {
            let mut connections = self.connections.write().await;
            let removed = connections.remove(&id);
            (removed, connections.len())
        };
        match removed {
            Some(conn) => {
                info!("client {} unregistered; total clients: {total}", conn.peer());
                true
            }
            None => false,
        }
    }

    /// Returns every registered connection except `exclude`.
    ///
    /// The snapshot is taken under one read-lock acquisition, so it reflects
    /// membership at a single instant.  Connections registered after the call
    /// are not included.
    pub async fn snapshot_excluding(&self, exclude: ConnectionId) -> Vec<Arc<Connection>> {
        self.connections
            .read()
            .await
            .iter()
            .filter(|(id, _)| **id != exclude)
            .map(|(_, conn)| Arc::clone(conn))
            .collect()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    /// Number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::transport::mock::recording_sink;

    fn make_conn(port: u16) -> Arc<Connection> {
        let (sink, _tap) = recording_sink();
        let peer = format!("127.0.0.1:{port}").parse().unwrap();
        Connection::new(ConnectionId::new(), peer, Box::new(sink))
    }

    fn ids(conns: &[Arc<Connection>]) -> Vec<ConnectionId> {
        let mut ids: Vec<_> = conns.iter().map(|c| c.id()).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_registry_starts_empty() {
        let registry = ConnectionRegistry::new();
        assert!(registry.is_empty().await);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_register_adds_connection() {
        let registry = ConnectionRegistry::new();
        let conn = make_conn(1);
        registry.register(Arc::clone(&conn)).await;
        assert!(registry.contains(conn.id()).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_twice_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let conn = make_conn(1);
        registry.register(Arc::clone(&conn)).await;
        registry.register(Arc::clone(&conn)).await;
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_removes_connection() {
        let registry = ConnectionRegistry::new();
        let conn = make_conn(1);
        registry.register(Arc::clone(&conn)).await;

        assert!(registry.unregister(conn.id()).await);

        assert!(!registry.contains(conn.id()).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_double_unregister_is_noop() {
        let registry = ConnectionRegistry::new();
        let conn = make_conn(1);
        registry.register(Arc::clone(&conn)).await;

        assert!(registry.unregister(conn.id()).await);
        assert!(!registry.unregister(conn.id()).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_unregister_unknown_id_is_noop() {
        let registry = ConnectionRegistry::new();
        registry.register(make_conn(1)).await;

        assert!(!registry.unregister(ConnectionId::new()).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_snapshot_excludes_sender() {
        let registry = ConnectionRegistry::new();
        let (a, b, c) = (make_conn(1), make_conn(2), make_conn(3));
        for conn in [&a, &b, &c] {
            registry.register(Arc::clone(conn)).await;
        }

        let snapshot = registry.snapshot_excluding(a.id()).await;

        let mut expected = vec![b.id(), c.id()];
        expected.sort();
        assert_eq!(ids(&snapshot), expected);
    }

    #[tokio::test]
    async fn test_snapshot_omits_unregistered() {
        let registry = ConnectionRegistry::new();
        let (a, b) = (make_conn(1), make_conn(2));
        registry.register(Arc::clone(&a)).await;
        registry.register(Arc::clone(&b)).await;
        registry.unregister(b.id()).await;

        let snapshot = registry.snapshot_excluding(ConnectionId::new()).await;

        assert_eq!(ids(&snapshot), vec![a.id()]);
    }

    #[tokio::test]
    async fn test_snapshot_is_not_affected_by_later_registration() {
        let registry = ConnectionRegistry::new();
        let a = make_conn(1);
        registry.register(Arc::clone(&a)).await;

        let snapshot = registry.snapshot_excluding(ConnectionId::new()).await;
        registry.register(make_conn(2)).await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_register_and_unregister_leave_consistent_state() {
        let registry = Arc::new(ConnectionRegistry::new());
        let conns: Vec<_> = (0..64).map(|i| make_conn(10_000 + i)).collect();

        let mut tasks = Vec::new();
        for conn in conns.iter().cloned() {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                registry.register(Arc::clone(&conn)).await;
                // Race two unregisters against each other.
                let (r1, r2) = tokio::join!(
                    registry.unregister(conn.id()),
                    registry.unregister(conn.id())
                );
                assert!(r1 ^ r2, "exactly one unregister must remove the entry");
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert!(registry.is_empty().await);
    }
}
