//! Per-connection handler: the authentication gate and request loop.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register the connection as unauthenticated
//!   2. Spawn a writer task draining the connection's outbound queue
//!   3. Loop: receive a message → read its `type` → gate on auth state
//!   4. On exit, unregister, then let the writer drain and stop
//!
//! Inbound messages are handled one at a time, in arrival order. Replies
//! and broadcast events go through the same outbound queue, so the client
//! sees them in the order they were queued.

use std::sync::Arc;

use monocle_protocol::{
    Codec, ErrorModel, LoginRequest, RequestType, Response,
};
use monocle_session::{
    outbound_channel, Authenticator, ConnectionEntry, ConnectionState,
    Outbound, OutboundReceiver, OutboundSender,
};
use monocle_transport::{Connection, ConnectionId, WebSocketConnection};

use crate::provider::GameStateProvider;
use crate::router::{self, RouteError};
use crate::server::ServerState;
use crate::MonocleError;

/// What the read loop does after handling one message.
enum Step {
    Continue,
    /// Close the connection without replying.
    Close,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<P, A, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<P, A, C>>,
) -> Result<(), MonocleError>
where
    P: GameStateProvider,
    A: Authenticator,
    C: Codec,
{
    let id = conn.id();
    let host = conn.remote_host().to_string();

    let (tx, rx) = outbound_channel();
    state
        .registry
        .lock()
        .await
        .register(ConnectionEntry::new(id, host.clone(), tx.clone()))?;

    let conn = Arc::new(conn);
    let writer = tokio::spawn(write_outbound(Arc::clone(&conn), rx));

    let result = read_loop(&conn, &state, id, &host, &tx).await;
    if let Err(e) = &result {
        tracing::error!(%id, host, error = %e, "connection task failed");
        let _ = tx.send(Outbound::Close);
    }

    // Removing the entry drops the registry's sender; once ours is gone
    // too, the writer flushes whatever is queued and exits.
    state.registry.lock().await.unregister(id);
    drop(tx);
    if let Err(e) = writer.await {
        tracing::debug!(%id, error = %e, "writer task failed");
    }

    result
}

/// Receives and handles messages until the peer leaves or the gate
/// rejects it.
async fn read_loop<P, A, C>(
    conn: &WebSocketConnection,
    state: &ServerState<P, A, C>,
    id: ConnectionId,
    host: &str,
    tx: &OutboundSender,
) -> Result<(), MonocleError>
where
    P: GameStateProvider,
    A: Authenticator,
    C: Codec,
{
    loop {
        let raw = match conn.recv().await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(%id, "connection closed by peer");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%id, error = %e, "recv error");
                return Ok(());
            }
        };

        match handle_message(state, id, host, tx, &raw).await? {
            Step::Continue => {}
            Step::Close => {
                let _ = tx.send(Outbound::Close);
                return Ok(());
            }
        }
    }
}

/// Applies the authentication gate to one inbound message.
///
/// 1. No valid `type` → `InvalidRequestType` error, whatever the state
/// 2. Authenticated → route the request
/// 3. Otherwise the whole message is a login attempt
async fn handle_message<P, A, C>(
    state: &ServerState<P, A, C>,
    id: ConnectionId,
    host: &str,
    tx: &OutboundSender,
    raw: &str,
) -> Result<Step, MonocleError>
where
    P: GameStateProvider,
    A: Authenticator,
    C: Codec,
{
    let Some(request_type) = state.codec.request_type(raw) else {
        tracing::debug!(%id, "request without a valid type");
        let text = state.codec.encode(&ErrorModel::invalid_request_type())?;
        return Ok(queue(tx, text));
    };

    let authenticated = state
        .registry
        .lock()
        .await
        .lookup(id)
        .is_some_and(ConnectionState::is_authenticated);

    if authenticated {
        let text = serve(state, id, request_type, raw)?;
        return Ok(queue(tx, text));
    }

    login(state, id, host, raw).await
}

/// Routes a request from an authenticated connection and encodes the
/// reply. Provider errors become error envelopes; a request with no
/// route ends the connection.
fn serve<P, A, C>(
    state: &ServerState<P, A, C>,
    id: ConnectionId,
    request_type: RequestType,
    raw: &str,
) -> Result<String, MonocleError>
where
    P: GameStateProvider,
    A: Authenticator,
    C: Codec,
{
    match router::serve(&state.provider, &state.codec, request_type, raw) {
        Ok(response) => Ok(state.codec.encode(&response)?),
        Err(RouteError::Api(err)) => {
            tracing::debug!(%id, %request_type, error = %err, "request failed");
            Ok(state.codec.encode(err.model())?)
        }
        Err(RouteError::Unroutable(request_type)) => {
            Err(MonocleError::Unroutable(request_type))
        }
    }
}

/// Treats `raw` as a login attempt from an unauthenticated connection.
///
/// On success the identity is bound and the success reply queued under
/// one registry lock, so no broadcast can reach the client ahead of it.
/// Any failure closes the connection with no reply.
async fn login<P, A, C>(
    state: &ServerState<P, A, C>,
    id: ConnectionId,
    host: &str,
    raw: &str,
) -> Result<Step, MonocleError>
where
    P: GameStateProvider,
    A: Authenticator,
    C: Codec,
{
    let request: LoginRequest = match state.codec.decode(raw) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(%id, host, error = %e, "malformed login, closing");
            return Ok(Step::Close);
        }
    };

    let identity = match state.auth.authenticate(&request).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!(%id, host, error = %e, "login rejected, closing");
            return Ok(Step::Close);
        }
    };

    let reply = state.codec.encode(&Response::successful_login())?;
    {
        let mut registry = state.registry.lock().await;
        let entry = registry.bind(id, identity.clone())?;
        entry.send(Outbound::Text(reply));
    }

    tracing::warn!(%id, host, user = %identity, "host logged in");
    Ok(Step::Continue)
}

/// Queues a reply. A closed queue means the writer already gave up on
/// the socket, so the reader stops too.
fn queue(tx: &OutboundSender, text: String) -> Step {
    match tx.send(Outbound::Text(text)) {
        Ok(()) => Step::Continue,
        Err(_) => Step::Close,
    }
}

/// Drains the outbound queue onto the socket.
///
/// Runs until a `Close` frame, a send failure, or every sender is gone.
async fn write_outbound(conn: Arc<WebSocketConnection>, mut rx: OutboundReceiver) {
    let id = conn.id();
    while let Some(frame) = rx.recv().await {
        match frame {
            Outbound::Text(text) => {
                if let Err(e) = conn.send(&text).await {
                    tracing::debug!(%id, error = %e, "send failed");
                    break;
                }
            }
            Outbound::Close => {
                if let Err(e) = conn.close().await {
                    tracing::debug!(%id, error = %e, "close failed");
                }
                break;
            }
        }
    }
}
