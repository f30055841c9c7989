use axum::{
    extract::{connect_info::ConnectInfo, Request, State},
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::client_context::{client_context_from_headers, reported_locator};
use super::middleware::RequestStart;
use crate::config::ClientIpConfig;
use crate::extractor::RequestLocation;
use crate::flow::{CapturingNavigator, FlowError, RedirectFlow};
use crate::metadata::extract_client_ip;
use crate::resolver::ResolveError;

pub struct RedirectState {
    pub flow: RedirectFlow,
    pub client_ip: ClientIpConfig,
}

/// Resolve the short code in the request location and redirect to it
pub async fn redirect_visit(State(state): State<Arc<RedirectState>>, request: Request) -> Response {
    let started = request
        .extensions()
        .get::<RequestStart>()
        .map(|RequestStart(at)| *at)
        .unwrap_or_else(Instant::now);

    let socket_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client_ip = socket_ip.map(|ip| extract_client_ip(request.headers(), ip, &state.client_ip));

    let location = RequestLocation::from_uri(request.uri());
    let ctx = client_context_from_headers(request.headers(), client_ip);
    let locator = reported_locator(request.headers());
    let navigator = CapturingNavigator::new();

    let session = state.flow.session();
    let outcome = session.run(&location, &ctx, &locator, &navigator).await;

    match outcome {
        Ok(destination) => {
            let destination = navigator.destination().unwrap_or(destination);
            tracing::info!(
                destination = %destination,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Visit resolved"
            );
            redirect_response(&destination)
        }
        Err(err) => (status_for(&err), err.to_string()).into_response(),
    }
}

fn redirect_response(destination: &str) -> Response {
    match HeaderValue::from_str(destination) {
        Ok(location) => (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, location)]).into_response(),
        Err(_) => (
            StatusCode::BAD_GATEWAY,
            ResolveError::InvalidResponse.to_string(),
        )
            .into_response(),
    }
}

/// HTTP status shown to the visitor for a failed flow
pub fn status_for(err: &FlowError) -> StatusCode {
    match err {
        FlowError::MissingCode => StatusCode::BAD_REQUEST,
        FlowError::Resolve(resolve) => match resolve {
            ResolveError::InvalidCode => StatusCode::BAD_REQUEST,
            ResolveError::NotFound => StatusCode::NOT_FOUND,
            ResolveError::Expired => StatusCode::GONE,
            ResolveError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ResolveError::Server { .. }
            | ResolveError::Rejected { .. }
            | ResolveError::InvalidResponse => StatusCode::BAD_GATEWAY,
        },
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
