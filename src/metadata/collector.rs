use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};

use super::browser::detect_browser;
use super::enrichment::{Enrichment, IpEnricher};
use super::locator::{DeviceLocator, LocateError, LocateOptions};
use crate::models::{iso_timestamp, ClientMetadata, DeviceLocation};

pub const UNKNOWN: &str = "unknown";
pub const DIRECT_REFERRER: &str = "direct";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Raw client attributes as observed by the hosting environment.
///
/// Nothing here is validated; empty values are replaced with placeholders
/// during collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientContext {
    pub user_agent: Option<String>,
    pub language: Option<String>,
    pub platform: Option<String>,
    pub referrer: Option<String>,
    pub screen_resolution: Option<String>,
    pub viewport: Option<String>,
    pub timezone: Option<String>,
    pub client_ip: Option<IpAddr>,
}

/// Builds `ClientMetadata` for one visit
#[derive(Clone)]
pub struct MetadataCollector {
    enricher: Option<IpEnricher>,
    locate_options: LocateOptions,
}

impl MetadataCollector {
    pub fn new(enricher: Option<IpEnricher>, geolocation_timeout: Duration) -> Self {
        Self {
            enricher,
            locate_options: LocateOptions {
                timeout: geolocation_timeout,
                high_accuracy: false,
            },
        }
    }

    /// Collect metadata. Enrichment failures are logged and leave the
    /// optional fields empty; this never fails.
    ///
    /// IP enrichment and device location run concurrently, each bounded by
    /// the geolocation timeout, so collection never takes longer than that.
    pub async fn collect(&self, ctx: &ClientContext, locator: &dyn DeviceLocator) -> ClientMetadata {
        let mut metadata = Self::base_metadata(ctx);

        let (enrichment, located) = tokio::join!(self.enrich(ctx.client_ip), self.locate(locator));

        metadata.ip_address = enrichment.ip_address;
        metadata.location = enrichment.location;
        match located {
            Ok(location) => metadata.browser_location = Some(location),
            Err(e) => debug!(error = %e, "Device location not available"),
        }

        metadata
    }

    async fn enrich(&self, client_ip: Option<IpAddr>) -> Enrichment {
        let Some(enricher) = &self.enricher else {
            return Enrichment::default();
        };

        let timeout = self.locate_options.timeout;
        match tokio::time::timeout(timeout, enricher.enrich(client_ip)).await {
            Ok(enrichment) => enrichment,
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "IP enrichment timed out");
                Enrichment::default()
            }
        }
    }

    /// The fields that are always available without any I/O
    pub fn base_metadata(ctx: &ClientContext) -> ClientMetadata {
        let user_agent = non_empty(&ctx.user_agent).unwrap_or_default();

        ClientMetadata {
            browser: detect_browser(&user_agent),
            user_agent,
            screen_resolution: non_empty(&ctx.screen_resolution).unwrap_or_else(|| UNKNOWN.to_string()),
            viewport: non_empty(&ctx.viewport).unwrap_or_else(|| UNKNOWN.to_string()),
            language: non_empty(&ctx.language).unwrap_or_else(|| UNKNOWN.to_string()),
            platform: non_empty(&ctx.platform).unwrap_or_else(|| UNKNOWN.to_string()),
            referer: non_empty(&ctx.referrer).unwrap_or_else(|| DIRECT_REFERRER.to_string()),
            timestamp: iso_timestamp(),
            timezone: non_empty(&ctx.timezone).unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            ip_address: None,
            location: None,
            browser_location: None,
        }
    }

    async fn locate(&self, locator: &dyn DeviceLocator) -> Result<DeviceLocation, LocateError> {
        let timeout = self.locate_options.timeout;
        match tokio::time::timeout(timeout, locator.locate(self.locate_options)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Device location request timed out");
                Err(LocateError::Timeout(timeout))
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
