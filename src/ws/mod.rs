//! WebSocket module — connection sessions and live connection tracking.
//!
//! - [`events`]: Lifecycle/message notifications published to observers.
//! - [`registry`]: Shared set of open connections and `send()`.
//! - [`session`]: Axum upgrade handler and per-connection receive loop.

pub mod events;
pub mod registry;
pub mod session;

pub use events::ServerEvent;
pub use registry::{ConnectionId, ConnectionRegistry, TransportError};
pub use session::ws_handler;
