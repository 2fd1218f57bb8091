//! HTTP router

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use serde_json::{Value, json};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::auth::require_client_cert;
use super::posts::{create_post, delete_post, list_posts, show_post, update_post};
use crate::config::{PostsConfig, ServerConfig};
use crate::mtls::CertificateAuthenticator;
use crate::posts::PostStore;

/// Shared application state
pub struct AppState {
    /// Post storage
    pub posts: Arc<dyn PostStore>,
    /// Client certificate authenticator for protected routes
    pub authenticator: Arc<CertificateAuthenticator>,
    /// Paging limits
    pub posts_config: PostsConfig,
}

/// Create the router
///
/// Every write route carries the client certificate middleware as a route
/// layer; reads and `/health` do not.
pub fn create_router(state: Arc<AppState>, server: &ServerConfig) -> Router {
    let client_cert =
        middleware::from_fn_with_state(Arc::clone(&state.authenticator), require_client_cert);

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/posts",
            get(list_posts).merge(post(create_post).route_layer(client_cert.clone())),
        )
        .route(
            "/api/posts/{id}",
            get(show_post).merge(
                put(update_post)
                    .patch(update_post)
                    .delete(delete_post)
                    .route_layer(client_cert),
            ),
        )
        .layer(DefaultBodyLimit::max(server.body_limit))
        .layer(timeout_layer(server.request_timeout))
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Requests running longer than `timeout` are answered with 408.
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// GET /health
async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
