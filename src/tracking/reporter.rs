use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{iso_timestamp, ClientMetadata, ResolutionResult, TrackingRecord};

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("tracking request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("tracking endpoint answered with status {0}")]
    Status(StatusCode),
    #[error("tracking endpoint did not answer within {0:?}")]
    Timeout(Duration),
}

/// Time allowed for one delivery unless configured otherwise
pub const DEFAULT_TRACKING_TIMEOUT: Duration = Duration::from_secs(5);

/// Destination for tracking records
#[async_trait]
pub trait TrackingSink: Send + Sync {
    async fn send(&self, record: &TrackingRecord) -> Result<(), TrackingError>;
}

/// Posts each record as JSON to a webhook
#[derive(Clone)]
pub struct WebhookSink {
    client: Client,
    webhook_url: String,
}

impl WebhookSink {
    pub fn new(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl TrackingSink for WebhookSink {
    async fn send(&self, record: &TrackingRecord) -> Result<(), TrackingError> {
        let response = self.client.post(&self.webhook_url).json(record).send().await?;
        if !response.status().is_success() {
            return Err(TrackingError::Status(response.status()));
        }
        Ok(())
    }
}

/// Builds and delivers one `TrackingRecord` per visit, swallowing failures
#[derive(Clone)]
pub struct TrackingReporter {
    sink: Option<Arc<dyn TrackingSink>>,
    timeout: Duration,
}

impl TrackingReporter {
    pub fn new(sink: Arc<dyn TrackingSink>) -> Self {
        Self {
            sink: Some(sink),
            timeout: DEFAULT_TRACKING_TIMEOUT,
        }
    }

    /// A reporter that drops every record
    pub fn disabled() -> Self {
        Self {
            sink: None,
            timeout: DEFAULT_TRACKING_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send the visit. Returns whether the record was delivered; callers
    /// must not branch on it for anything but logging.
    pub async fn report(
        &self,
        result: &ResolutionResult,
        metadata: &ClientMetadata,
        short_code: &str,
    ) -> bool {
        let Some(sink) = &self.sink else {
            return false;
        };

        let record = TrackingRecord::new(short_code, result, metadata, iso_timestamp());
        let sent = tokio::time::timeout(self.timeout, sink.send(&record))
            .await
            .unwrap_or(Err(TrackingError::Timeout(self.timeout)));

        match sent {
            Ok(()) => {
                debug!(short_code = %short_code, "Tracking data sent");
                true
            }
            Err(e) => {
                warn!(short_code = %short_code, error = %e, "Failed to send tracking data");
                false
            }
        }
    }
}
