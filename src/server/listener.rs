//! Bind/accept loop — owns the listening socket and spawns one
//! connection task per accepted client.
//!
//! `axum::serve` is deliberately not used here: its graceful shutdown
//! waits for in-flight connections, while `stop()` must only unblock the
//! accept wait and leave open WebSocket sessions running. The loop below
//! drives each connection with hyper directly (upgrades enabled) so the
//! two lifetimes stay independent.

use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::router::create_router;
use super::state::{AppState, SharedState};
use crate::config::AppConfig;

/// The listening address was unavailable at startup.
#[derive(Debug, thiserror::Error)]
#[error("failed to bind {addr}: {source}")]
pub struct BindError {
    pub addr: String,
    #[source]
    pub source: std::io::Error,
}

/// The WebSocket echo service: one accept loop, one session per client.
pub struct EchoServer {
    state: SharedState,
    shutdown: watch::Sender<bool>,
}

impl EchoServer {
    /// Create a server for the given configuration. Nothing is bound
    /// until [`start`](Self::start) or [`run`](Self::run).
    pub fn new(config: AppConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        EchoServer {
            state: AppState::new(config),
            shutdown,
        }
    }

    /// Handle to the shared state (registry access for observers).
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Bind the configured address and serve until [`stop`](Self::stop).
    ///
    /// Only the bind failure propagates; everything after binding is
    /// contained per connection.
    pub async fn start(&self) -> Result<(), BindError> {
        let addr = self.state.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| BindError { addr, source })?;
        self.run(listener).await;
        Ok(())
    }

    /// Accept loop on an already-bound listener, until [`stop`](Self::stop).
    ///
    /// Each accepted socket is served on its own task; an accept error is
    /// logged and the loop continues. Returns cleanly on stop — in-flight
    /// sessions are not cancelled.
    pub async fn run(&self, listener: TcpListener) {
        if let Ok(addr) = listener.local_addr() {
            info!("listening for WebSocket connections on {addr}");
        }

        let app = create_router(self.state.clone());
        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            if *shutdown_rx.borrow_and_update() {
                break;
            }

            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // Loop re-checks the flag.
                }
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            warn!("accept failed: {err}");
                            continue;
                        }
                    };
                    debug!(%peer, "accepted connection");

                    let service = TowerToHyperService::new(app.clone());
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        if let Err(err) = auto::Builder::new(TokioExecutor::new())
                            .serve_connection_with_upgrades(io, service)
                            .await
                        {
                            debug!(%peer, "connection ended with error: {err}");
                        }
                    });
                }
            }
        }

        info!("stopped listening for WebSocket connections");
    }

    /// Close the accept loop. Idempotent: repeat calls only log. Open
    /// sessions keep running until they close or error on their own.
    pub fn stop(&self) {
        if self.shutdown.send_replace(true) {
            debug!("stop called on an already-stopped listener");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
