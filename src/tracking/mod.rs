//! Best-effort visit tracking
//!
//! A tracking failure never reaches the caller: the flow continues to the
//! redirect whether or not the record was delivered.

pub mod reporter;

pub use reporter::{
    TrackingError, TrackingReporter, TrackingSink, WebhookSink, DEFAULT_TRACKING_TIMEOUT,
};
