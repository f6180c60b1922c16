//! `MonocleServer` builder and server loop.
//!
//! This is the entry point for running Monocle. It ties the layers
//! together: transport → protocol → session → router/broadcaster.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use monocle_protocol::{Codec, JsonCodec};
use monocle_session::{Authenticator, ConnectionRegistry};
use monocle_transport::{Transport, TransportError, WebSocketTransport};
use tokio::sync::Mutex;

use crate::broadcast::{EventBroadcaster, EventHandle};
use crate::config::MonocleConfig;
use crate::handler::handle_connection;
use crate::provider::GameStateProvider;
use crate::MonocleError;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<P, A, C> {
    pub(crate) registry: Arc<Mutex<ConnectionRegistry>>,
    pub(crate) provider: P,
    pub(crate) auth: A,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Monocle server.
///
/// # Example
///
/// ```rust,ignore
/// use monocle::prelude::*;
///
/// let server = MonocleServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(my_provider, config.credential_store())
///     .await?;
/// let events = server.events();
/// server.run_until(tokio::signal::ctrl_c()).await
/// ```
pub struct MonocleServerBuilder {
    bind_addr: String,
}

impl MonocleServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Takes the listen address from a loaded configuration.
    pub fn config(self, config: &MonocleConfig) -> Result<Self, MonocleError> {
        let addr = config.bind_addr()?;
        Ok(self.bind(&addr.to_string()))
    }

    /// Binds the listener and starts the event broadcaster.
    ///
    /// Connections are not accepted until [`MonocleServer::run`] or
    /// [`MonocleServer::run_until`] is called.
    pub async fn build<P, A>(
        self,
        provider: P,
        auth: A,
    ) -> Result<MonocleServer<P, A, JsonCodec>, MonocleError>
    where
        P: GameStateProvider,
        A: Authenticator,
    {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let events = EventBroadcaster::new(Arc::clone(&registry), JsonCodec).spawn();

        let state = Arc::new(ServerState {
            registry,
            provider,
            auth,
            codec: JsonCodec,
        });

        Ok(MonocleServer {
            transport,
            state,
            events,
        })
    }
}

impl Default for MonocleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Monocle server.
pub struct MonocleServer<P, A, C> {
    transport: WebSocketTransport,
    state: Arc<ServerState<P, A, C>>,
    events: EventHandle,
}

impl MonocleServer<(), (), JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> MonocleServerBuilder {
        MonocleServerBuilder::new()
    }
}

impl<P, A, C> MonocleServer<P, A, C>
where
    P: GameStateProvider,
    A: Authenticator,
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle the host's event source uses to raise events.
    pub fn events(&self) -> EventHandle {
        self.events.clone()
    }

    /// Number of open connections, logged in or not.
    pub async fn connection_count(&self) -> usize {
        self.state.registry.lock().await.len()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), MonocleError> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Runs the accept loop until `shutdown` completes, then closes every
    /// open connection.
    ///
    /// Each accepted connection gets its own handler task. A failed
    /// accept or handshake is logged and the loop keeps going.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<(), MonocleError>
    where
        F: Future,
    {
        tracing::info!(addr = ?self.local_addr().ok(), "Monocle server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(TransportError::HandshakeFailed(reason)) => {
                        tracing::debug!(%reason, "WebSocket handshake failed");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        tracing::info!("Stopping server");
        let closed = self.state.registry.lock().await.close_all();
        self.transport.shutdown().await?;
        tracing::info!(closed, "server stopped");
        Ok(())
    }
}
