//! Connection registry
//!
//! Maps an authenticated identity to exactly one live connection handle.
//! Bindings are per-key atomic: `bind` evicts any prior binding for the
//! same identity in one operation (last-writer-wins), and `unbind` only
//! removes the binding when it still points at the caller's connection,
//! so a stale close can never evict a newer binding.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::{CloseFrame, Message};
use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::store::AccountId;
use crate::ws::protocol::ServerFrame;

/// Process-unique connection identifier
pub type ConnectionId = u64;

/// Sending side of a live connection.
///
/// Cloneable; messages pushed here are drained by the connection's
/// writer task in FIFO order.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Message>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Serialize and enqueue a frame. Returns false when the connection
    /// is no longer writable (its writer task has exited).
    pub fn send(&self, frame: &ServerFrame) -> bool {
        let text = match serde_json::to_string(frame) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize outbound frame");
                return false;
            }
        };
        self.tx.send(Message::Text(text)).is_ok()
    }

    /// Enqueue a close frame for this connection
    pub fn close(&self, code: u16, reason: &'static str) {
        let _ = self.tx.send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })));
    }
}

/// Identity → live connection bindings, shared across connection actors
pub struct ConnectionRegistry {
    bindings: DashMap<AccountId, ConnectionHandle>,
    next_connection_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            bindings: DashMap::new(),
            next_connection_id: AtomicU64::new(1),
        }
    }

    /// Allocate an id for a newly accepted connection
    pub fn next_connection_id(&self) -> ConnectionId {
        self.next_connection_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Install a binding for `identity`, returning the evicted prior
    /// handle if a *different* connection held the binding. The caller
    /// is responsible for closing the evicted connection.
    pub fn bind(&self, identity: AccountId, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        self.bindings
            .insert(identity, handle.clone())
            .filter(|prior| prior.id != handle.id)
    }

    pub fn lookup(&self, identity: AccountId) -> Option<ConnectionHandle> {
        self.bindings.get(&identity).map(|entry| entry.clone())
    }

    /// Remove the binding for `identity` if and only if it still points
    /// at `connection_id`. Returns whether a binding was removed.
    pub fn unbind(&self, identity: AccountId, connection_id: ConnectionId) -> bool {
        self.bindings
            .remove_if(&identity, |_, handle| handle.id == connection_id)
            .is_some()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
