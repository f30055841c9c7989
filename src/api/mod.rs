pub mod backend;
pub mod handlers;
pub mod routes;

pub use backend::{BackendClient, ProxyError, WebhookForwarder};
pub use routes::create_api_router;
