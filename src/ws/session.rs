//! WebSocket session — the upgrade handler and the per-connection
//! receive loop.
//!
//! Each accepted upgrade runs one session: register in the shared
//! registry, pump frames until the peer closes or the transport errors,
//! unregister on the way out. Outbound writes go through a per-connection
//! queue whose receiving half lives in the writer task, so `send()` from
//! any observer never touches the socket directly.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, close_code};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::server::state::SharedState;

/// The single WebSocket endpoint — upgrade or 400.
///
/// A request that does not qualify as a WebSocket upgrade (wrong method,
/// missing or malformed handshake headers) gets an empty `400 Bad
/// Request`; the accept loop is unaffected either way.
pub async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<SharedState>,
) -> Response {
    match ws {
        Ok(upgrade) => upgrade.on_upgrade(move |socket| handle_socket(socket, state)),
        Err(rejection) => {
            debug!("rejected non-upgrade request: {rejection}");
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

/// Core session logic for one established connection.
async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let id = state.registry.register(outbound_tx).await;
    let (mut sink, mut stream) = socket.split();

    // Writer task: drain the outbound queue into the socket. When the
    // queue ends (unregister dropped the sender), reply with a
    // normal-closure frame — harmless if the transport is already gone.
    let mut writer = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let close = Message::Close(Some(CloseFrame {
            code: close_code::NORMAL,
            reason: Utf8Bytes::default(),
        }));
        let _ = sink.send(close).await;
    });

    // Reader task: the receive loop. Text frames become events; a close
    // frame or a transport error ends the session; other frame types
    // fall through without producing an event.
    let registry = state.registry.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(Message::Text(text)) => registry.publish_message(id, text.to_string()),
                Ok(Message::Close(_)) => {
                    debug!(connection_id = id, "peer closed the connection");
                    break;
                }
                Ok(_) => {} // Binary / Ping / Pong: stay open, no event
                Err(err) => {
                    debug!(connection_id = id, "transport error: {err}");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut writer => {
            // Write side died; there is nothing left to echo to.
            reader.abort();
            state.registry.unregister(id).await;
        }
        _ = &mut reader => {
            // Unregister first: that drops the outbound sender, letting
            // the writer drain pending frames and send the close reply.
            state.registry.unregister(id).await;
            let _ = writer.await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
