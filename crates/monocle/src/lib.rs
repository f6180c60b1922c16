//! # Monocle
//!
//! Live game-server state and events over WebSocket.
//!
//! Monocle runs next to a game server and lets authorized dashboards and
//! bots look inside it. Clients log in with a username and password, then
//! query players, structures, barricades, vehicles, and server info, and
//! receive game events (deaths, chat, joins, leaves) as they happen.
//!
//! The embedding host supplies two things: a [`GameStateProvider`] that
//! reads the live game, and events pushed through an [`EventHandle`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use monocle::prelude::*;
//!
//! // Implement GameStateProvider for your game, then:
//! // let config = MonocleConfig::load("monocle.toml").await?;
//! // let server = MonocleServer::builder()
//! //     .config(&config)?
//! //     .build(MyGame::new(), config.credential_store())
//! //     .await?;
//! // let events = server.events();
//! // server.run_until(tokio::signal::ctrl_c()).await
//! ```

mod broadcast;
mod config;
mod error;
mod handler;
mod provider;
mod router;
mod server;

pub use broadcast::{EventBroadcaster, EventHandle};
pub use config::{ConfigError, MonocleConfig};
pub use error::MonocleError;
pub use provider::GameStateProvider;
pub use server::{MonocleServer, MonocleServerBuilder};

/// Everything needed to embed a server: the server types plus the wire
/// records and auth types from the lower layers.
pub mod prelude {
    pub use crate::{
        ConfigError, EventHandle, GameStateProvider, MonocleConfig,
        MonocleError, MonocleServer, MonocleServerBuilder,
    };
    pub use monocle_protocol::models::*;
    pub use monocle_protocol::{
        ApiError, DomainEvent, ErrorModel, ErrorType, EventType, LoginRequest,
        RequestType, Response, ResponseType,
    };
    pub use monocle_session::{
        Authenticator, Credential, CredentialStore, Identity, SessionError,
    };
}
