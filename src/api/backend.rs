//! Client for the real lookup backend and the external tracking webhook

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use crate::resolver::ResolveError;

/// Lookup failures, each carrying the status the proxy answers with
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{}", ResolveError::NotFound)]
    NotFound,
    #[error("{}", ResolveError::Expired)]
    Expired,
    #[error("Server error: {} {}", .0.as_u16(), .0.canonical_reason().unwrap_or("Unknown"))]
    Upstream(StatusCode),
    #[error("Unable to connect to the backend server")]
    Unreachable(#[source] reqwest::Error),
    #[error("The backend returned an unreadable response")]
    InvalidBody(#[source] reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NotFound => StatusCode::NOT_FOUND,
            ProxyError::Expired => StatusCode::GONE,
            ProxyError::Upstream(status) => *status,
            ProxyError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::InvalidBody(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    api_base_url: String,
}

impl BackendClient {
    pub fn new(client: Client, api_base_url: &str) -> Self {
        Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the backend's JSON for `code`, passed through untouched on success
    pub async fn lookup(&self, code: &str) -> Result<Value, ProxyError> {
        let url = format!("{}/redirector/{}", self.api_base_url, code);

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!(short_code = %code, error = %e, "Error fetching from backend");
            ProxyError::Unreachable(e)
        })?;

        match response.status() {
            status if status.is_success() => response.json::<Value>().await.map_err(|e| {
                warn!(short_code = %code, error = %e, "Backend returned invalid JSON");
                ProxyError::InvalidBody(e)
            }),
            StatusCode::NOT_FOUND => Err(ProxyError::NotFound),
            StatusCode::GONE => Err(ProxyError::Expired),
            status => Err(ProxyError::Upstream(status)),
        }
    }
}

/// Forwards received tracking bodies to an external webhook
#[derive(Clone)]
pub struct WebhookForwarder {
    client: Client,
    url: String,
}

impl WebhookForwarder {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Best-effort: failures are logged, never returned
    pub async fn forward(&self, body: &Value) {
        let result = self
            .client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        if let Err(e) = result {
            warn!(url = %self.url, error = %e, "Failed to forward to external webhook");
        }
    }
}
