//! Device-reported geolocation

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::models::DeviceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable")]
    Unavailable,
    #[error("location request timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateOptions {
    pub timeout: Duration,
    pub high_accuracy: bool,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            high_accuracy: false,
        }
    }
}

/// Source of the device's own position
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    async fn locate(&self, options: LocateOptions) -> Result<DeviceLocation, LocateError>;
}

/// Serves whatever the client reported alongside its request
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportedLocator {
    reported: Option<Result<DeviceLocation, LocateError>>,
}

impl ReportedLocator {
    pub fn new(reported: Option<DeviceLocation>) -> Self {
        Self {
            reported: reported.map(Ok),
        }
    }

    pub fn denied() -> Self {
        Self {
            reported: Some(Err(LocateError::PermissionDenied)),
        }
    }
}

#[async_trait]
impl DeviceLocator for ReportedLocator {
    async fn locate(&self, _options: LocateOptions) -> Result<DeviceLocation, LocateError> {
        self.reported.unwrap_or(Err(LocateError::Unavailable))
    }
}

/// Parse a `lat,long[,accuracy]` report such as `-6.2,106.8,1500`
pub fn parse_reported_location(value: &str) -> Option<DeviceLocation> {
    let mut parts = value.split(',').map(str::trim);
    let latitude: f64 = parts.next()?.parse().ok()?;
    let longitude: f64 = parts.next()?.parse().ok()?;
    let accuracy: f64 = match parts.next() {
        Some(raw) => raw.parse().ok()?,
        None => 0.0,
    };

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    Some(DeviceLocation {
        latitude,
        longitude,
        accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reported_location() {
        let location = parse_reported_location("-6.2, 106.8, 1500").unwrap();
        assert_eq!(location.latitude, -6.2);
        assert_eq!(location.longitude, 106.8);
        assert_eq!(location.accuracy, 1500.0);

        assert_eq!(parse_reported_location("1,2").unwrap().accuracy, 0.0);
        assert!(parse_reported_location("91,0").is_none());
        assert!(parse_reported_location("abc").is_none());
    }

    #[tokio::test]
    async fn test_reported_locator_outcomes() {
        let options = LocateOptions::default();
        assert!(!options.high_accuracy);

        let absent = ReportedLocator::new(None);
        assert_eq!(absent.locate(options).await, Err(LocateError::Unavailable));

        let denied = ReportedLocator::denied();
        assert_eq!(denied.locate(options).await, Err(LocateError::PermissionDenied));

        let reported = ReportedLocator::new(parse_reported_location("1,2,3"));
        assert_eq!(reported.locate(options).await.unwrap().accuracy, 3.0);
    }
}
