//! Event broadcaster: pushes game events to every logged-in connection.
//!
//! The host's event source talks to Monocle through an [`EventHandle`],
//! a cheap clonable sender with a synchronous
//! [`on_domain_event`](EventHandle::on_domain_event). Game hooks usually
//! fire on the game thread, outside any async context, so the handle just
//! queues the event. A single broadcaster task drains the queue and fans
//! each event out, which keeps events in the order they were raised.
//!
//! ```text
//! game hook ──on_domain_event──→ [queue] ──→ broadcaster task
//!                                               │ lock registry
//!                                               ├─→ conn A outbound
//!                                               └─→ conn B outbound
//! ```

use std::sync::Arc;

use monocle_protocol::{Codec, DomainEvent, ProtocolError};
use monocle_session::{ConnectionRegistry, Outbound};
use tokio::sync::{mpsc, Mutex};

/// Fans events out to authenticated connections.
pub struct EventBroadcaster<C: Codec> {
    registry: Arc<Mutex<ConnectionRegistry>>,
    codec: C,
}

impl<C: Codec> EventBroadcaster<C> {
    pub fn new(registry: Arc<Mutex<ConnectionRegistry>>, codec: C) -> Self {
        Self { registry, codec }
    }

    /// Sends `event` to every connection that is authenticated right now.
    ///
    /// The event is encoded once and queued on each connection's
    /// outbound channel while the registry lock is held, so a connection
    /// that is unregistered concurrently either gets it before leaving or
    /// not at all. A connection whose queue is already closed is skipped;
    /// it never holds up the others.
    ///
    /// Returns the number of connections the event was queued for.
    pub async fn broadcast(&self, event: &DomainEvent) -> Result<usize, ProtocolError> {
        let text = self.codec.encode(event)?;
        let event_type = event.event_type();

        let registry = self.registry.lock().await;
        let mut delivered = 0;
        let targeted = registry.for_each_authenticated(|entry| {
            if entry.send(Outbound::Text(text.clone())) {
                delivered += 1;
            } else {
                tracing::debug!(
                    id = %entry.id(),
                    ?event_type,
                    "connection closing, event dropped"
                );
            }
        });
        drop(registry);

        tracing::debug!(?event_type, targeted, delivered, "event broadcast");
        Ok(delivered)
    }

    /// Moves the broadcaster onto its own task and returns the handle
    /// that feeds it.
    ///
    /// The task stops once every [`EventHandle`] has been dropped.
    pub fn spawn(self) -> EventHandle {
        let (tx, mut rx) = mpsc::unbounded_channel::<DomainEvent>();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = self.broadcast(&event).await {
                    tracing::error!(error = %e, "failed to encode event");
                }
            }
            tracing::debug!("event broadcaster stopped");
        });
        EventHandle { tx }
    }
}

/// Entry point for the host's event source.
///
/// Clone it into every game hook that raises events.
#[derive(Debug, Clone)]
pub struct EventHandle {
    tx: mpsc::UnboundedSender<DomainEvent>,
}

impl EventHandle {
    /// Queues a domain event for broadcast. Never blocks, never fails.
    ///
    /// Events raised after the server has shut down are dropped.
    pub fn on_domain_event(&self, event: DomainEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event broadcaster stopped, event dropped");
        }
    }
}
