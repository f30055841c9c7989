use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Milliseconds spent answering, pre-redirect delay included
pub const TIMING_HEADER: &str = "x-redirector-timing-total-ms";

#[derive(Copy, Clone)]
pub struct RequestStart(pub Instant);

pub async fn record_timing(mut request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    request.extensions_mut().insert(RequestStart(started));

    let mut response = next.run(request).await;
    response.headers_mut().insert(
        TIMING_HEADER,
        HeaderValue::from(started.elapsed().as_millis() as u64),
    );
    response
}
