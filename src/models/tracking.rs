use serde::{Deserialize, Serialize};

use super::{ClientMetadata, ResolutionResult};

/// Payload describing one resolved visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub short_code: String,
    pub original_url: String,
    pub user_info: ClientMetadata,
    pub url_data: ResolutionResult,
    pub click_timestamp: String,
}

impl TrackingRecord {
    pub fn new(
        short_code: &str,
        result: &ResolutionResult,
        metadata: &ClientMetadata,
        click_timestamp: String,
    ) -> Self {
        Self {
            short_code: short_code.to_string(),
            original_url: result.original_url.clone(),
            user_info: metadata.clone(),
            url_data: result.clone(),
            click_timestamp,
        }
    }
}
