//! Connection registry — tracks open WebSocket connections and provides
//! `send()` to push a text frame to any one of them.
//!
//! Sessions add and remove themselves concurrently, so every mutation
//! and lookup goes through an async `RwLock`. Lifecycle transitions
//! double as the notification source for [`ServerEvent`] observers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, broadcast, mpsc};
use tracing::debug;

use super::events::ServerEvent;

/// Sending half of a connection's outbound queue. The session's writer
/// task owns the receiving half and performs the actual socket writes.
pub type OutboundSender = mpsc::UnboundedSender<String>;

/// A unique ID assigned to each connection for its lifetime.
pub type ConnectionId = u64;

/// Events dropped by slow observers are bounded by this queue depth.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Failure to write a text frame to a connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection {0} is not open")]
    NotOpen(ConnectionId),

    #[error("connection {0} closed before the message could be written")]
    Closed(ConnectionId),
}

/// Shared set of open connections, keyed by [`ConnectionId`].
///
/// A connection is present exactly while its session is between
/// "accepted" and "terminated": `register` inserts it, `unregister`
/// removes it, and both emit the matching [`ServerEvent`].
#[derive(Debug)]
pub struct ConnectionRegistry {
    /// connection_id → outbound sender
    conns: RwLock<HashMap<ConnectionId, OutboundSender>>,
    /// Monotonically increasing counter for connection IDs.
    next_id: AtomicU64,
    /// Notification channel observers subscribe to.
    events: broadcast::Sender<ServerEvent>,
}

impl ConnectionRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Subscribe to lifecycle and message notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    /// Register a newly upgraded connection, returning its ID.
    /// Emits [`ServerEvent::ConnectionStarted`].
    pub async fn register(&self, sender: OutboundSender) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.conns.write().await.insert(id, sender);

        debug!(connection_id = id, "connection registered");
        self.emit(ServerEvent::ConnectionStarted { id });
        id
    }

    /// Remove a connection once its session has terminated.
    ///
    /// Idempotent: only the call that actually removes the entry emits
    /// [`ServerEvent::ConnectionFinished`], so observers see exactly one
    /// finish per connection no matter how many exit paths race here.
    pub async fn unregister(&self, id: ConnectionId) {
        let removed = self.conns.write().await.remove(&id).is_some();
        if removed {
            debug!(connection_id = id, "connection unregistered");
            self.emit(ServerEvent::ConnectionFinished { id });
        }
    }

    /// Queue one text frame for delivery on an open connection.
    ///
    /// Fails when the connection is unknown (already unregistered) or
    /// its writer has gone away. Callers on the echo path log the error
    /// rather than surfacing it to the peer.
    pub async fn send(&self, id: ConnectionId, text: String) -> Result<(), TransportError> {
        let conns = self.conns.read().await;
        let sender = conns.get(&id).ok_or(TransportError::NotOpen(id))?;
        sender.send(text).map_err(|_| TransportError::Closed(id))
    }

    /// Publish a received text frame to all observers.
    /// Called by the session's receive loop, once per inbound message.
    pub fn publish_message(&self, id: ConnectionId, text: String) {
        self.emit(ServerEvent::MessageReceived { id, text });
    }

    /// Whether a connection is currently registered.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.conns.read().await.contains_key(&id)
    }

    /// Number of open connections.
    pub async fn connection_count(&self) -> usize {
        self.conns.read().await.len()
    }

    /// IDs of all open connections.
    pub async fn connection_ids(&self) -> Vec<ConnectionId> {
        self.conns.read().await.keys().copied().collect()
    }

    /// Send fails only when nobody is subscribed, which is fine.
    fn emit(&self, event: ServerEvent) {
        let _ = self.events.send(event);
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            conns: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            events,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
