pub mod metadata;
pub mod resolution;
pub mod tracking;

pub use metadata::{Browser, ClientMetadata, DeviceLocation, IpLocation};
pub use resolution::{LookupEnvelope, ResolutionResult, UrlData};
pub use tracking::TrackingRecord;

/// Current time as an ISO-8601 UTC string with millisecond precision
/// (`2024-05-01T12:00:00.123Z`).
pub fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
