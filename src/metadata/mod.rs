//! Client metadata collection
//!
//! Synchronous attributes always come from the `ClientContext`. IP and
//! device location enrichment are attempted on top and may silently fail.

pub mod browser;
pub mod collector;
pub mod enrichment;
pub mod ip_extractor;
pub mod locator;

pub use browser::detect_browser;
pub use collector::{ClientContext, MetadataCollector};
pub use enrichment::{Enrichment, EnrichmentError, IpEnricher};
pub use ip_extractor::extract_client_ip;
pub use locator::{DeviceLocator, LocateError, LocateOptions, ReportedLocator};
