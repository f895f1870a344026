use std::sync::Arc;

use ws_echo::config::AppConfig;
use ws_echo::echo;
use ws_echo::server::EchoServer;

#[tokio::main]
async fn main() {
    // Initialize tracing (structured logging).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ws_echo=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    let server = Arc::new(EchoServer::new(config));

    // Wire the echo policy and lifecycle logging to the event channel.
    echo::spawn_echo_responder(server.state());

    // Ctrl-C stops the accept loop; open sessions drain on their own.
    let sig_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            sig_server.stop();
        }
    });

    tracing::info!("ws-echo v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(err) = server.start().await {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}
