use axum::Router;
use axum::http::StatusCode;
use axum::routing::any;
use tower_http::trace::TraceLayer;

use super::state::SharedState;
use crate::ws;

/// Build the Axum router.
///
/// The service exposes exactly one endpoint — WebSocket upgrades at `/`.
/// Everything else (any other path, any non-upgrade request) is answered
/// with an empty `400 Bad Request`.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", any(ws::ws_handler))
        .fallback(bad_request)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Catch-all for requests outside the WebSocket endpoint.
async fn bad_request() -> StatusCode {
    StatusCode::BAD_REQUEST
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::server::state::AppState;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::new(AppConfig::default()))
    }

    #[tokio::test]
    async fn plain_get_on_root_is_400() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn post_on_root_is_400() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_path_is_400() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_upgrade_request_fires_no_events() {
        let state = AppState::new(AppConfig::default());
        let mut events = state.registry.subscribe();

        let response = create_router(state.clone())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(events.try_recv().is_err());
        assert_eq!(state.registry.connection_count().await, 0);
    }
}
