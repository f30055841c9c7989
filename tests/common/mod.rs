//! Fake upstream services for integration tests
//!
//! Each fake is a small axum app served on an ephemeral local port.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use redirector::flow::{NavigationTrigger, RedirectFlow};
use redirector::metadata::{IpEnricher, MetadataCollector};
use redirector::resolver::LookupClient;
use redirector::tracking::{TrackingReporter, WebhookSink};

pub const GOOGLE: &str = "https://www.google.com";

/// Serve `router` on 127.0.0.1 and return its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on
pub async fn closed_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Server that accepts every request and never answers it
pub async fn spawn_hanging_server() -> String {
    let router = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(300)).await;
        StatusCode::OK
    });
    spawn_server(router).await
}

/// Lookup backend answering `/api/redirector/{code}` with a fixed script
#[derive(Clone, Default)]
pub struct FakeLookup {
    pub calls: Arc<AtomicUsize>,
}

impl FakeLookup {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Start the backend and return its API base (`http://host:port/api`)
    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/api/redirector/{code}", get(scripted_lookup))
            .with_state(self.clone());
        format!("{}/api", spawn_server(router).await)
    }
}

async fn scripted_lookup(State(fake): State<FakeLookup>, Path(code): Path<String>) -> Response {
    fake.calls.fetch_add(1, Ordering::SeqCst);

    match code.as_str() {
        "nYRU4u" => Json(json!({
            "status": "success",
            "data": {
                "original_url": GOOGLE,
                "short_code": "nYRU4u",
                "created_at": "2024-01-01T00:00:00.000Z",
                "expires_at": null
            }
        }))
        .into_response(),
        "flat" => Json(json!({
            "status": "success",
            "original_url": "https://example.com/flat",
            "message": "URL found"
        }))
        .into_response(),
        "gone" => StatusCode::GONE.into_response(),
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "refused" => Json(json!({"status": "error", "message": "Link disabled by owner"})).into_response(),
        "statusless" => Json(json!({"message": "Link disabled by owner"})).into_response(),
        "garbled" => (StatusCode::OK, "<html>not json</html>").into_response(),
        "sneaky" => Json(json!({
            "status": "success",
            "data": {"original_url": "javascript:alert(1)"}
        }))
        .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": "not here"})),
        )
            .into_response(),
    }
}

/// Webhook that records every JSON body it receives
#[derive(Clone)]
pub struct FakeWebhook {
    pub bodies: Arc<Mutex<Vec<Value>>>,
    status: StatusCode,
}

impl FakeWebhook {
    pub fn new(status: StatusCode) -> Self {
        Self {
            bodies: Arc::new(Mutex::new(Vec::new())),
            status,
        }
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    /// Start the webhook and return its URL
    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/hook", post(record_body))
            .with_state(self.clone());
        format!("{}/hook", spawn_server(router).await)
    }
}

async fn record_body(State(hook): State<FakeWebhook>, Json(body): Json<Value>) -> StatusCode {
    hook.bodies.lock().unwrap().push(body);
    hook.status
}

/// IP identification plus geolocation services, served from one app
pub async fn spawn_enrichment_services(ip: &'static str) -> (String, String) {
    let router = Router::new()
        .route("/ip", get(move || async move { Json(json!({ "ip": ip })) }))
        .route(
            "/geo/{ip}/json/",
            get(|Path(ip): Path<String>| async move {
                Json(json!({
                    "ip": ip,
                    "country_name": "Indonesia",
                    "country_code": "ID",
                    "region": "Jakarta",
                    "city": "Jakarta",
                    "latitude": -6.2146,
                    "longitude": 106.8451,
                    "timezone": "Asia/Jakarta"
                }))
            }),
        );
    let base = spawn_server(router).await;
    (format!("{}/ip", base), format!("{}/geo/{{ip}}/json/", base))
}

/// Flow wired to real HTTP clients, without enrichment
pub fn build_flow(api_base: &str, webhook_url: &str, delay: Duration) -> RedirectFlow {
    build_flow_with_enricher(api_base, webhook_url, delay, None)
}

pub fn build_flow_with_enricher(
    api_base: &str,
    webhook_url: &str,
    delay: Duration,
    enricher: Option<IpEnricher>,
) -> RedirectFlow {
    let reporter = TrackingReporter::new(Arc::new(WebhookSink::new(
        reqwest::Client::new(),
        webhook_url,
    )));
    build_flow_with(api_base, reporter, delay, enricher, Duration::from_secs(5))
}

pub fn build_flow_with(
    api_base: &str,
    reporter: TrackingReporter,
    delay: Duration,
    enricher: Option<IpEnricher>,
    geolocation_timeout: Duration,
) -> RedirectFlow {
    RedirectFlow::new(
        MetadataCollector::new(enricher, geolocation_timeout),
        Arc::new(LookupClient::new(reqwest::Client::new(), api_base, None)),
        reporter,
        NavigationTrigger::new(delay),
    )
}
