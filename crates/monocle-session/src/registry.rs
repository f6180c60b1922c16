//! The connection registry: every open connection and who it belongs to.
//!
//! # Concurrency note
//!
//! `ConnectionRegistry` is a plain `HashMap` with `&mut self` mutators. It
//! is shared between connection tasks and the event broadcaster behind a
//! single mutex at the server level. Every operation here, including the
//! whole of [`for_each_authenticated`](ConnectionRegistry::for_each_authenticated),
//! runs under that lock, so a connection is either fully registered, fully
//! bound, or fully gone from a broadcast's point of view. Nothing in this
//! module awaits.

use std::collections::HashMap;

use monocle_transport::ConnectionId;

use crate::{ConnectionEntry, ConnectionState, Identity, Outbound, SessionError};

/// Tracks all open connections.
///
/// ## Lifecycle
///
/// ```text
/// register() ──→ [Unauthenticated] ──bind()──→ [Authenticated]
///      │                 │                            │
///      └─────────────────┴──────── unregister() ──────┘
/// ```
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly opened connection. It starts unauthenticated.
    ///
    /// # Errors
    /// [`SessionError::AlreadyRegistered`] if the id is already present.
    pub fn register(&mut self, entry: ConnectionEntry) -> Result<(), SessionError> {
        let id = entry.id();
        if self.connections.contains_key(&id) {
            return Err(SessionError::AlreadyRegistered(id));
        }
        tracing::info!(%id, host = entry.host(), "new connection");
        self.connections.insert(id, entry);
        Ok(())
    }

    /// Binds an identity to a connection, making it authenticated.
    ///
    /// Returns the entry so the caller can queue the login reply while
    /// still holding the registry lock; that guarantees the reply is the
    /// first frame the client sees after becoming eligible for events.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`]: no such connection
    /// - [`SessionError::AlreadyAuthenticated`]: an identity is already
    ///   bound; it is never replaced
    pub fn bind(
        &mut self,
        id: ConnectionId,
        identity: Identity,
    ) -> Result<&ConnectionEntry, SessionError> {
        let entry = self
            .connections
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;

        if entry.state().is_authenticated() {
            return Err(SessionError::AlreadyAuthenticated(id));
        }

        entry.set_state(ConnectionState::Authenticated(identity));
        Ok(entry)
    }

    /// Forgets a connection entirely. Called when the transport closes.
    ///
    /// Returns the removed entry, or `None` if it was not registered.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<ConnectionEntry> {
        let entry = self.connections.remove(&id)?;
        tracing::info!(%id, host = entry.host(), "closed connection");
        if let Some(identity) = entry.state().identity() {
            tracing::info!(%id, user = %identity, "user logged off");
        }
        Some(entry)
    }

    /// Calls `f` for every authenticated connection.
    ///
    /// Order is unspecified. Returns how many connections were visited.
    pub fn for_each_authenticated<F>(&self, mut f: F) -> usize
    where
        F: FnMut(&ConnectionEntry),
    {
        let mut visited = 0;
        for entry in self.connections.values() {
            if entry.state().is_authenticated() {
                f(entry);
                visited += 1;
            }
        }
        visited
    }

    /// Looks up a connection's state. `None` means not registered.
    pub fn lookup(&self, id: ConnectionId) -> Option<&ConnectionState> {
        self.connections.get(&id).map(ConnectionEntry::state)
    }

    /// Queues a close for every registered connection.
    ///
    /// Used on server shutdown. Entries stay registered until each
    /// connection's own task unregisters it.
    pub fn close_all(&self) -> usize {
        for entry in self.connections.values() {
            entry.send(Outbound::Close);
        }
        self.connections.len()
    }

    /// Number of open connections, authenticated or not.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Number of authenticated connections.
    pub fn authenticated_count(&self) -> usize {
        self.connections
            .values()
            .filter(|e| e.state().is_authenticated())
            .count()
    }
}

// =========================================================================
// Tests
// =========================================================================
