//! The echo policy — a host-side observer of the connection core.
//!
//! Subscribes to the registry's event channel, logs lifecycle events,
//! and answers every received text message with `"Echo: " + text`. The
//! sessions themselves know nothing about this policy; swapping it out
//! (or adding more observers) needs no change to the core.

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::server::state::SharedState;
use crate::ws::ServerEvent;

/// Spawn [`run_echo_responder`] on its own task.
pub fn spawn_echo_responder(state: SharedState) -> JoinHandle<()> {
    tokio::spawn(run_echo_responder(state))
}

/// Consume server events until the event channel closes.
///
/// A failed echo write is logged and dropped — the peer that triggered
/// it never hears about the failure, its socket just stays quiet.
pub async fn run_echo_responder(state: SharedState) {
    let mut events = state.registry.subscribe();

    loop {
        match events.recv().await {
            Ok(ServerEvent::ConnectionStarted { id }) => {
                info!(connection_id = id, "started a new WebSocket connection");
            }
            Ok(ServerEvent::ConnectionFinished { id }) => {
                info!(connection_id = id, "ended a WebSocket connection");
            }
            Ok(ServerEvent::MessageReceived { id, text }) => {
                info!(connection_id = id, message = %text, "message received");
                let reply = format!("Echo: {text}");
                if let Err(err) = state.registry.send(id, reply).await {
                    debug!(connection_id = id, "echo not delivered: {err}");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "echo responder lagged behind the event channel");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
