//! Client metadata collected for every visit

use serde::{Deserialize, Serialize};
use std::fmt;

/// Browser family derived from the user agent string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    Edge,
    Opera,
    Unknown,
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Browser::Chrome => "Chrome",
            Browser::Firefox => "Firefox",
            Browser::Safari => "Safari",
            Browser::Edge => "Edge",
            Browser::Opera => "Opera",
            Browser::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Coarse location derived from the client IP address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpLocation {
    /// Country name (e.g., "Indonesia")
    pub country: Option<String>,

    /// ISO country code (e.g., "ID")
    pub country_code: Option<String>,

    /// Region/state/province
    pub region: Option<String>,

    /// City name
    pub city: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// IANA timezone name reported by the geolocation service
    pub timezone: Option<String>,
}

/// Position reported by the client device itself
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters
    pub accuracy: f64,
}

/// Everything known about the visiting client.
///
/// The required fields are always populated. `ip_address`, `location` and
/// `browser_location` are only present when enrichment succeeded and are
/// left out of the serialized form otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub user_agent: String,
    pub browser: Browser,
    pub screen_resolution: String,
    pub viewport: String,
    pub language: String,
    pub platform: String,
    pub referer: String,
    pub timestamp: String,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<IpLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_location: Option<DeviceLocation>,
}
