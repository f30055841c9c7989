//! Short code extraction from the request location
//!
//! A code may arrive in three places, checked in this order:
//! - the last non-empty path segment (`/nYRU4u`), unless it looks like a
//!   static asset (contains a `.`)
//! - the `code` query parameter (`/?code=nYRU4u`)
//! - the fragment (`/#nYRU4u`), unless it contains a `/`

use axum::http::Uri;
use url::Url;

/// The parts of a request location that can carry a short code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLocation {
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl RequestLocation {
    /// Location as seen by a server. Fragments are never sent over HTTP.
    pub fn from_uri(uri: &Uri) -> Self {
        Self {
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            fragment: None,
        }
    }

    /// Parse a full URL such as `https://go.example.com/?code=abc#def`
    pub fn parse(href: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(href)?;
        Ok(Self {
            path: url.path().to_string(),
            query: url.query().map(str::to_string),
            fragment: url.fragment().map(str::to_string),
        })
    }

    fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// Derive the short code from `location`, or `None` if it carries none
pub fn extract_short_code(location: &RequestLocation) -> Option<String> {
    if let Some(last) = location.path.split('/').rfind(|s| !s.is_empty()) {
        if !last.contains('.') {
            return Some(last.to_string());
        }
    }

    if let Some(code) = location.query_param("code").filter(|c| !c.is_empty()) {
        return Some(code);
    }

    location
        .fragment
        .as_deref()
        .filter(|hash| !hash.is_empty() && !hash.contains('/'))
        .map(str::to_string)
}
