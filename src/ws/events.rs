//! Notifications published by the WebSocket core.
//!
//! The registry owns a `tokio::sync::broadcast` channel; any number of
//! observers subscribe and receive every event. The echo policy in
//! [`crate::echo`] is one such observer — the sessions themselves never
//! decide what (if anything) gets sent back.

use super::registry::ConnectionId;

/// One lifecycle or message notification from the connection core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// A WebSocket upgrade completed and the connection was registered.
    ConnectionStarted { id: ConnectionId },
    /// A session ended and the connection was removed from the registry.
    ConnectionFinished { id: ConnectionId },
    /// A text frame arrived on an open connection.
    MessageReceived { id: ConnectionId, text: String },
}

impl ServerEvent {
    /// The connection the event belongs to.
    pub fn connection_id(&self) -> ConnectionId {
        match self {
            ServerEvent::ConnectionStarted { id }
            | ServerEvent::ConnectionFinished { id }
            | ServerEvent::MessageReceived { id, .. } => *id,
        }
    }
}
