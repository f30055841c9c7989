use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use super::backend::{BackendClient, WebhookForwarder};
use crate::models::LookupEnvelope;
use crate::resolver::validate_short_code;

pub struct ApiState {
    pub backend: BackendClient,
    pub forwarder: Option<WebhookForwarder>,
    pub short_code_max_length: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub status: String,
    pub message: String,
}

impl ApiMessage {
    fn success(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            status: "error".to_string(),
            message: message.to_string(),
        }
    }
}

/// Look up a short code on the backend
pub async fn lookup_code(
    State(state): State<Arc<ApiState>>,
    Path(code): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<LookupEnvelope>)> {
    if let Err(e) = validate_short_code(&code, state.short_code_max_length) {
        return Err((StatusCode::BAD_REQUEST, Json(LookupEnvelope::error(e.to_string()))));
    }

    state.backend.lookup(&code).await.map(Json).map_err(|e| {
        info!(short_code = %code, status = e.status().as_u16(), "Backend lookup failed");
        (e.status(), Json(LookupEnvelope::error(e.to_string())))
    })
}

/// Receive a tracking record
pub async fn receive_tracking(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> (StatusCode, Json<ApiMessage>) {
    let record: Value = match serde_json::from_slice(&body) {
        Ok(record) => record,
        Err(e) => {
            warn!(error = %e, "Tracking body is not valid JSON");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiMessage::error("Failed to process tracking data")),
            );
        }
    };

    let short_code = non_empty_str(&record, "short_code");
    let original_url = non_empty_str(&record, "original_url");
    let (Some(short_code), Some(original_url)) = (short_code, original_url) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiMessage::error("Missing required fields")),
        );
    };

    let user_info = record.get("user_info");
    let field = |name: &str| {
        user_info
            .and_then(|info| info.get(name))
            .map(Value::to_string)
            .unwrap_or_else(|| "null".to_string())
    };
    info!(
        short_code = %short_code,
        original_url = %original_url,
        timestamp = %field_str(&record, "click_timestamp"),
        user_agent = %field("user_agent"),
        browser = %field("browser"),
        location = %field("location"),
        ip_address = %field("ip_address"),
        "Tracking data received"
    );

    if let Some(forwarder) = &state.forwarder {
        forwarder.forward(&record).await;
    }

    (
        StatusCode::OK,
        Json(ApiMessage::success("Tracking data received successfully")),
    )
}

fn non_empty_str<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn field_str<'a>(record: &'a Value, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("")
}
