use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::config::ClientIpConfig;
use crate::flow::RedirectFlow;

use super::handlers::{health_check, redirect_visit, RedirectState};
use super::middleware::record_timing;

/// Visitor-facing routes. The code may sit in any path segment or in the
/// `code` query parameter, so everything is routed to the same handler.
pub fn create_redirect_router(flow: RedirectFlow, client_ip: ClientIpConfig) -> Router {
    let state = Arc::new(RedirectState { flow, client_ip });

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(redirect_visit))
        .route("/{*path}", get(redirect_visit))
        .layer(middleware::from_fn(record_timing))
        .with_state(state)
}
