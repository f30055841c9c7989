use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

use super::error::ResolveError;
use crate::models::{LookupEnvelope, ResolutionResult};

/// Maps a short code to its destination
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, code: &str) -> Result<ResolutionResult, ResolveError>;
}

/// Check that `code` is non-empty and ASCII alphanumeric. `max_len`, when
/// set, additionally caps its length.
pub fn validate_short_code(code: &str, max_len: Option<usize>) -> Result<(), ResolveError> {
    let too_long = max_len.is_some_and(|max| code.len() > max);
    if code.is_empty() || too_long || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ResolveError::InvalidCode);
    }
    Ok(())
}

/// Resolver backed by the lookup endpoint `GET {api_base}/redirector/{code}`.
///
/// A single attempt is made per call.
#[derive(Clone)]
pub struct LookupClient {
    client: Client,
    api_base_url: String,
    max_code_length: Option<usize>,
}

impl LookupClient {
    pub fn new(client: Client, api_base_url: &str, max_code_length: Option<usize>) -> Self {
        Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            max_code_length,
        }
    }

    pub fn lookup_url(&self, code: &str) -> String {
        format!("{}/redirector/{}", self.api_base_url, code)
    }
}

#[async_trait]
impl Resolver for LookupClient {
    async fn resolve(&self, code: &str) -> Result<ResolutionResult, ResolveError> {
        validate_short_code(code, self.max_code_length)?;

        let url = self.lookup_url(code);
        debug!(short_code = %code, url = %url, "Fetching URL data");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ResolveError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            info!(short_code = %code, status = status.as_u16(), "Lookup failed");
            return Err(match status {
                StatusCode::NOT_FOUND => ResolveError::NotFound,
                StatusCode::GONE => ResolveError::Expired,
                other => ResolveError::Server {
                    status: other.as_u16(),
                    reason: other.canonical_reason().unwrap_or("Unknown").to_string(),
                },
            });
        }

        let envelope: LookupEnvelope = response.json().await.map_err(|e| {
            info!(short_code = %code, error = %e, "Lookup response is not a valid envelope");
            ResolveError::InvalidResponse
        })?;

        if !envelope.is_success() {
            info!(short_code = %code, status = %envelope.status, "Lookup rejected");
            return Err(ResolveError::rejected(envelope.message));
        }

        let result =
            ResolutionResult::from_envelope(envelope).ok_or(ResolveError::InvalidResponse)?;
        if !is_navigable(&result.original_url) {
            info!(short_code = %code, destination = %result.original_url, "Lookup returned a non-http destination");
            return Err(ResolveError::InvalidResponse);
        }
        Ok(result)
    }
}

/// Only absolute http(s) destinations are followed
fn is_navigable(destination: &str) -> bool {
    Url::parse(destination)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}
