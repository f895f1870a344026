//! Server module — the Listener side of the service.
//!
//! - [`state`]: Shared application state handed to handlers.
//! - [`router`]: Axum router — the WebSocket endpoint plus the 400 wall.
//! - [`listener`]: Bind/accept loop with idempotent stop.

pub mod listener;
pub mod router;
pub mod state;

pub use listener::{BindError, EchoServer};
pub use router::create_router;
pub use state::{AppState, SharedState};
