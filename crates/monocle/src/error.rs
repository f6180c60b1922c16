//! Unified error type for Monocle.

use monocle_protocol::{ProtocolError, RequestType};
use monocle_session::SessionError;
use monocle_transport::TransportError;

use crate::config::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum MonocleError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (registry or authentication).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A request type reached the router with no route for it. This is a
    /// server bug, not a client mistake: the connection is dropped and
    /// nothing is sent back.
    #[error("request type {0} has no route")]
    Unroutable(RequestType),
}
