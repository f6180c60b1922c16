//! Authentication and connection tracking for Monocle.
//!
//! 1. **Credentials**: who may log in ([`CredentialStore`], behind the
//!    [`Authenticator`] trait)
//! 2. **Connection registry**: which connections are open and which of
//!    them are logged in ([`ConnectionRegistry`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)   ← gates requests and broadcasts on registry state
//!     ↕
//! Session (this crate)
//!     ↕
//! Protocol / Transport (below)   ← LoginRequest, ConnectionId
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod registry;
mod session;

pub use auth::{Authenticator, CredentialStore};
pub use error::SessionError;
pub use registry::ConnectionRegistry;
pub use session::{
    outbound_channel, ConnectionEntry, ConnectionState, Credential, Identity,
    Outbound, OutboundReceiver, OutboundSender,
};
