use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// URL record carried in the `data` member of a lookup envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlData {
    pub original_url: String,
    #[serde(default)]
    pub short_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// JSON wrapper returned by the lookup endpoint.
///
/// Most backends nest the record under `data`; some answer with a flat
/// `original_url` next to `status`. Both shapes are accepted. A missing
/// `status` is treated as a rejection, not as a malformed body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupEnvelope {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<UrlData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LookupEnvelope {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            data: None,
            original_url: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Destination URL from either envelope shape
    pub fn destination(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.original_url.as_str())
            .or(self.original_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Outcome of a successful lookup, echoed verbatim into the tracking record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub status: String,
    pub original_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl ResolutionResult {
    /// Build a result from a successful envelope. Returns `None` when the
    /// envelope does not carry a destination.
    pub fn from_envelope(envelope: LookupEnvelope) -> Option<Self> {
        let original_url = envelope.destination()?.to_string();
        let data = envelope.data;

        Some(Self {
            status: envelope.status,
            original_url,
            message: envelope.message,
            short_code: data.as_ref().and_then(|d| d.short_code.clone()),
            created_at: data.as_ref().and_then(|d| d.created_at.clone()),
            expires_at: data.and_then(|d| d.expires_at),
        })
    }
}
