//! IP address identification and IP-based geolocation
//!
//! Both lookups are best-effort. `IpEnricher::enrich` never fails; it logs
//! and returns whatever it managed to obtain.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::IpAddr;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EnrichmentConfig;
use crate::models::IpLocation;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("service answered with status {0}")]
    Status(StatusCode),
    #[error("service returned no usable IP address")]
    MissingIp,
    #[error("geolocation service rejected the lookup: {0}")]
    Rejected(String),
}

/// Result of an enrichment attempt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub ip_address: Option<String>,
    pub location: Option<IpLocation>,
}

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
    country_name: Option<String>,
    country_code: Option<String>,
    region: Option<String>,
    city: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    timezone: Option<String>,
}

#[derive(Clone)]
pub struct IpEnricher {
    client: Client,
    ip_lookup_url: String,
    geo_lookup_url: String,
}

impl IpEnricher {
    pub fn new(config: &EnrichmentConfig, client: Client) -> Self {
        Self {
            client,
            ip_lookup_url: config.ip_lookup_url.clone(),
            geo_lookup_url: config.geo_lookup_url.clone(),
        }
    }

    /// Look up the IP address and its location.
    ///
    /// A public `known_ip` (taken from the request) is used directly;
    /// otherwise the identification service is asked.
    pub async fn enrich(&self, known_ip: Option<IpAddr>) -> Enrichment {
        let ip = match self.identify(known_ip).await {
            Ok(ip) => ip,
            Err(e) => {
                warn!(error = %e, "Could not determine client IP address");
                return Enrichment::default();
            }
        };

        let location = match self.geolocate(&ip).await {
            Ok(location) => Some(location),
            Err(e) => {
                warn!(ip = %ip, error = %e, "Could not fetch IP location");
                None
            }
        };

        Enrichment {
            ip_address: Some(ip),
            location,
        }
    }

    pub async fn identify(&self, known_ip: Option<IpAddr>) -> Result<String, EnrichmentError> {
        if let Some(ip) = known_ip.filter(|ip| is_public(*ip)) {
            return Ok(ip.to_string());
        }

        debug!(url = %self.ip_lookup_url, "Asking identification service for client IP");
        let response = self.client.get(&self.ip_lookup_url).send().await?;
        if !response.status().is_success() {
            return Err(EnrichmentError::Status(response.status()));
        }

        let body: IpResponse = response.json().await?;
        let ip = body.ip.trim();
        if ip.parse::<IpAddr>().is_err() {
            return Err(EnrichmentError::MissingIp);
        }
        Ok(ip.to_string())
    }

    pub async fn geolocate(&self, ip: &str) -> Result<IpLocation, EnrichmentError> {
        let url = self.geo_lookup_url.replace("{ip}", ip);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(EnrichmentError::Status(response.status()));
        }

        let body: GeoResponse = response.json().await?;
        if body.error {
            return Err(EnrichmentError::Rejected(
                body.reason.unwrap_or_else(|| "unknown reason".to_string()),
            ));
        }

        Ok(IpLocation {
            country: body.country_name,
            country_code: body.country_code,
            region: body.region,
            city: body.city,
            latitude: body.latitude,
            longitude: body.longitude,
            timezone: body.timezone,
        })
    }
}

/// Whether `ip` can identify a client on the public internet
pub fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            let shared = a == 100 && (64..128).contains(&b);
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || shared)
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            let unique_local = (first & 0xfe00) == 0xfc00;
            let link_local = (first & 0xffc0) == 0xfe80;
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_public(IpAddr::V4(v4));
            }
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_public() {
        for ip in ["8.8.8.8", "203.0.113.7", "2001:4860::8888"] {
            assert!(is_public(ip.parse().unwrap()), "{ip} should be public");
        }
        for ip in [
            "127.0.0.1",
            "10.1.2.3",
            "192.168.0.4",
            "172.16.0.1",
            "100.64.0.1",
            "169.254.1.1",
            "0.0.0.0",
            "::1",
            "fd00::1",
            "fe80::1",
            "::ffff:10.0.0.1",
        ] {
            assert!(!is_public(ip.parse().unwrap()), "{ip} should not be public");
        }
    }

    #[tokio::test]
    async fn test_public_known_ip_skips_identification() {
        let config = EnrichmentConfig {
            enabled: true,
            // Unroutable: any request here would fail the test
            ip_lookup_url: "http://127.0.0.1:9/ip".to_string(),
            geo_lookup_url: "http://127.0.0.1:9/{ip}".to_string(),
            geolocation_timeout_ms: 5000,
        };
        let enricher = IpEnricher::new(&config, Client::new());

        let ip = enricher
            .identify(Some("203.0.113.7".parse().unwrap()))
            .await
            .unwrap();
        assert_eq!(ip, "203.0.113.7");
    }
}
