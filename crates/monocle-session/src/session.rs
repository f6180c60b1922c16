//! Per-connection session data.
//!
//! A connection starts out anonymous and may become bound to exactly one
//! [`Identity`]. There is no way back: the only route to an anonymous
//! state is closing the socket and connecting again.
//!
//! ```text
//!   Unauthenticated ──(bind)──→ Authenticated(identity)
//! ```

use std::fmt;

use monocle_transport::ConnectionId;
use serde::Deserialize;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Identity & Credential
// ---------------------------------------------------------------------------

/// The username a connection authenticated as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    pub fn username(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A username/password pair from the server configuration.
///
/// Stored and compared as plaintext.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// Authentication state of one connection.
///
/// Holding the identity inside the `Authenticated` variant means a
/// connection cannot be "authenticated without a user" or "anonymous with
/// a user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unauthenticated,
    Authenticated(Identity),
}

impl ConnectionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, ConnectionState::Authenticated(_))
    }

    /// The bound identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            ConnectionState::Authenticated(identity) => Some(identity),
            ConnectionState::Unauthenticated => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound queue
// ---------------------------------------------------------------------------

/// A frame queued for delivery to one connection.
///
/// Replies and broadcast events share the queue, so everything a client
/// receives arrives in the order it was queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// An encoded envelope.
    Text(String),
    /// Close the socket. Frames queued after this are dropped.
    Close,
}

/// Sending half of a connection's outbound queue.
pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

/// Receiving half of a connection's outbound queue.
pub type OutboundReceiver = mpsc::UnboundedReceiver<Outbound>;

/// Creates an outbound queue for a new connection.
///
/// The queue is unbounded. A client that stays connected but stops
/// reading keeps every broadcast queued in memory until its socket
/// fails or it disconnects; like the missing login timeout, this is an
/// open hardening item.
pub fn outbound_channel() -> (OutboundSender, OutboundReceiver) {
    mpsc::unbounded_channel()
}

// ---------------------------------------------------------------------------
// ConnectionEntry
// ---------------------------------------------------------------------------

/// The registry's record of one open connection.
#[derive(Debug)]
pub struct ConnectionEntry {
    id: ConnectionId,
    host: String,
    state: ConnectionState,
    outbound: OutboundSender,
}

impl ConnectionEntry {
    /// Creates an unauthenticated entry.
    pub fn new(id: ConnectionId, host: impl Into<String>, outbound: OutboundSender) -> Self {
        Self {
            id,
            host: host.into(),
            state: ConnectionState::Unauthenticated,
            outbound,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Remote host label, for logs.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Queues a frame for this connection.
    ///
    /// Returns `false` if the connection's writer is already gone. That
    /// only happens while the connection is shutting down, so callers
    /// treat it as a dropped delivery rather than an error.
    pub fn send(&self, frame: Outbound) -> bool {
        self.outbound.send(frame).is_ok()
    }

    pub(crate) fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }
}
