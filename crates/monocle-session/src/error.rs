//! Error types for the session layer.

use monocle_transport::ConnectionId;

/// Errors that can occur while authenticating or tracking connections.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The credentials did not match any configured user.
    ///
    /// The server never tells the client *why*; this is for logs only.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// No connection with this id is registered.
    #[error("connection {0} is not registered")]
    NotFound(ConnectionId),

    /// The connection is already bound to an identity. Identities are
    /// immutable once bound.
    #[error("connection {0} is already authenticated")]
    AlreadyAuthenticated(ConnectionId),

    /// A connection with this id is already registered.
    #[error("connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),
}
