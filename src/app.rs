use anyhow::{Context, Result};
use axum::Router;
use reqwest::Client;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::api::{create_api_router, BackendClient, WebhookForwarder};
use crate::config::Config;
use crate::flow::RedirectFlow;
use crate::redirect::create_redirect_router;

/// Ceilings for every upstream call. The tracking and enrichment steps
/// have tighter bounds of their own.
const UPSTREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const UPSTREAM_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("redirector/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(UPSTREAM_CONNECT_TIMEOUT)
        .timeout(UPSTREAM_REQUEST_TIMEOUT)
        .build()
        .context("failed to build HTTP client")
}

/// The full service: lookup proxy and callback under `/api`, visitor
/// redirects everywhere else
pub fn create_app_router(config: &Config) -> Result<Router> {
    let client = http_client()?;

    let flow = RedirectFlow::from_config(config, client.clone());
    let backend = BackendClient::new(client.clone(), &config.backend.api_base_url);
    let forwarder = config
        .backend
        .external_webhook_url
        .as_deref()
        .map(|url| WebhookForwarder::new(client, url));

    let api_router = create_api_router(backend, forwarder, config.redirect.short_code_max_length);
    let redirect_router = create_redirect_router(flow, config.client_ip.clone());

    Ok(api_router
        .merge(redirect_router)
        .layer(TraceLayer::new_for_http()))
}
