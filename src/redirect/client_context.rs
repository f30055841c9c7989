//! `ClientContext` from request headers
//!
//! Standard headers cover user agent, language, platform and referrer.
//! Screen size, timezone and device position are not sent by browsers on
//! their own; a client that knows them reports them with `X-Client-*`
//! headers.

use axum::http::HeaderMap;
use std::net::IpAddr;

use crate::metadata::locator::parse_reported_location;
use crate::metadata::{ClientContext, ReportedLocator};

pub const CLIENT_SCREEN_HEADER: &str = "x-client-screen";
pub const CLIENT_VIEWPORT_HEADER: &str = "x-client-viewport";
pub const CLIENT_TIMEZONE_HEADER: &str = "x-client-timezone";
pub const CLIENT_GEOLOCATION_HEADER: &str = "x-client-geolocation";

pub fn client_context_from_headers(headers: &HeaderMap, client_ip: Option<IpAddr>) -> ClientContext {
    ClientContext {
        user_agent: header(headers, "user-agent"),
        language: header(headers, "accept-language").and_then(|v| primary_language(&v)),
        platform: header(headers, "sec-ch-ua-platform").map(|v| v.trim_matches('"').to_string()),
        referrer: header(headers, "referer"),
        screen_resolution: header(headers, CLIENT_SCREEN_HEADER),
        viewport: header(headers, CLIENT_VIEWPORT_HEADER).or_else(|| hinted_viewport(headers)),
        timezone: header(headers, CLIENT_TIMEZONE_HEADER),
        client_ip,
    }
}

/// Device position reported in `X-Client-Geolocation` (`lat,long[,accuracy]`
/// or `denied`)
pub fn reported_locator(headers: &HeaderMap) -> ReportedLocator {
    match header(headers, CLIENT_GEOLOCATION_HEADER) {
        Some(value) if value.eq_ignore_ascii_case("denied") => ReportedLocator::denied(),
        Some(value) => ReportedLocator::new(parse_reported_location(&value)),
        None => ReportedLocator::new(None),
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// First tag of an `Accept-Language` list: `id-ID,id;q=0.9,en;q=0.8` → `id-ID`
fn primary_language(accept_language: &str) -> Option<String> {
    accept_language
        .split(',')
        .next()
        .and_then(|tag| tag.split(';').next())
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && *tag != "*")
        .map(str::to_string)
}

fn hinted_viewport(headers: &HeaderMap) -> Option<String> {
    let width = header(headers, "sec-ch-viewport-width").or_else(|| header(headers, "viewport-width"))?;
    let height = header(headers, "sec-ch-viewport-height")?;
    Some(format!("{}x{}", width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{DeviceLocator, LocateError, LocateOptions};
    use axum::http::HeaderValue;

    #[test]
    fn test_context_from_browser_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_static("Mozilla/5.0 Firefox/125.0"));
        headers.insert("accept-language", HeaderValue::from_static("id-ID,id;q=0.9,en;q=0.8"));
        headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Windows\""));
        headers.insert("referer", HeaderValue::from_static("https://news.example.com/"));
        headers.insert("sec-ch-viewport-width", HeaderValue::from_static("1280"));
        headers.insert("sec-ch-viewport-height", HeaderValue::from_static("720"));
        headers.insert(CLIENT_SCREEN_HEADER, HeaderValue::from_static("1920x1080"));
        headers.insert(CLIENT_TIMEZONE_HEADER, HeaderValue::from_static("Asia/Jakarta"));

        let ctx = client_context_from_headers(&headers, Some("203.0.113.7".parse().unwrap()));

        assert_eq!(ctx.language.as_deref(), Some("id-ID"));
        assert_eq!(ctx.platform.as_deref(), Some("Windows"));
        assert_eq!(ctx.referrer.as_deref(), Some("https://news.example.com/"));
        assert_eq!(ctx.viewport.as_deref(), Some("1280x720"));
        assert_eq!(ctx.screen_resolution.as_deref(), Some("1920x1080"));
        assert_eq!(ctx.timezone.as_deref(), Some("Asia/Jakarta"));
        assert_eq!(ctx.client_ip, Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn test_bare_request_has_empty_context() {
        let ctx = client_context_from_headers(&HeaderMap::new(), None);
        assert_eq!(ctx, ClientContext::default());
    }

    #[test]
    fn test_primary_language() {
        assert_eq!(primary_language("en-US").as_deref(), Some("en-US"));
        assert_eq!(primary_language("fr;q=0.5, en").as_deref(), Some("fr"));
        assert_eq!(primary_language("*"), None);
    }

    #[tokio::test]
    async fn test_reported_locator_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_GEOLOCATION_HEADER, HeaderValue::from_static("denied"));
        assert_eq!(
            reported_locator(&headers).locate(LocateOptions::default()).await,
            Err(LocateError::PermissionDenied)
        );

        headers.insert(CLIENT_GEOLOCATION_HEADER, HeaderValue::from_static("-6.2,106.8,30"));
        let location = reported_locator(&headers)
            .locate(LocateOptions::default())
            .await
            .unwrap();
        assert_eq!(location.accuracy, 30.0);
    }
}
