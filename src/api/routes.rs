use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::backend::{BackendClient, WebhookForwarder};
use super::handlers::{lookup_code, receive_tracking, ApiState};

/// Routes under `/api`: the lookup proxy and the tracking callback
pub fn create_api_router(
    backend: BackendClient,
    forwarder: Option<WebhookForwarder>,
    short_code_max_length: Option<usize>,
) -> Router {
    let state = Arc::new(ApiState {
        backend,
        forwarder,
        short_code_max_length,
    });

    Router::new()
        .route("/api/redirector/{code}", get(lookup_code))
        .route("/api/callback", post(receive_tracking))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
