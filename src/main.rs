use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use redirector::app::create_app_router;
use redirector::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("redirector=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");
    info!("🔎 Lookup API: {}", config.redirect.api_base_url);
    info!("📊 Tracking webhook: {}", config.redirect.webhook_url);
    info!("🗄️  Backend: {}", config.backend.api_base_url);
    if let Some(ref external) = config.backend.external_webhook_url {
        info!("📨 Forwarding tracking data to {}", external);
    }
    if !config.enrichment.enabled {
        info!("🌐 IP and location enrichment is disabled");
    }

    let app = create_app_router(&config)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Redirector listening on http://{}", addr);
    info!("   - Redirects at {}/{{code}}", config.public_base_url);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Redirector stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
