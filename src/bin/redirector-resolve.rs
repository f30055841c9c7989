use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use redirector::app::http_client;
use redirector::config::Config;
use redirector::extractor::RequestLocation;
use redirector::flow::{NavigationTrigger, Navigator, RedirectFlow};
use redirector::metadata::{ClientContext, IpEnricher, MetadataCollector, ReportedLocator};
use redirector::resolver::LookupClient;
use redirector::tracking::{TrackingReporter, WebhookSink};

#[derive(Parser)]
#[command(name = "redirector-resolve")]
#[command(about = "Run the redirect flow for a short link without a browser", long_about = None)]
struct Cli {
    /// Full short link, e.g. https://go.example.com/nYRU4u or https://go.example.com/#nYRU4u
    url: String,
    /// Lookup API base (defaults to REDIRECTOR_API_BASE_URL)
    #[arg(long)]
    api_base: Option<String>,
    /// Tracking endpoint (defaults to REDIRECTOR_WEBHOOK_URL)
    #[arg(long)]
    webhook: Option<String>,
    /// Do not send a tracking record
    #[arg(long)]
    no_track: bool,
    /// Pre-redirect delay in milliseconds (defaults to REDIRECT_DELAY_MS)
    #[arg(long)]
    delay_ms: Option<u64>,
}

struct PrintNavigator;

#[async_trait]
impl Navigator for PrintNavigator {
    async fn navigate(&self, destination: &str) {
        println!("→ {}", destination);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("redirector=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let client = http_client()?;

    let location = RequestLocation::parse(&cli.url)
        .with_context(|| format!("'{}' is not a valid URL", cli.url))?;

    let api_base = cli.api_base.unwrap_or_else(|| config.redirect.api_base_url.clone());
    let webhook = cli.webhook.unwrap_or_else(|| config.redirect.webhook_url.clone());
    let delay = Duration::from_millis(cli.delay_ms.unwrap_or(config.redirect.delay_ms));

    let enricher = config
        .enrichment
        .enabled
        .then(|| IpEnricher::new(&config.enrichment, client.clone()));
    let reporter = if cli.no_track {
        TrackingReporter::disabled()
    } else {
        TrackingReporter::new(Arc::new(WebhookSink::new(client.clone(), webhook)))
            .with_timeout(config.redirect.tracking_timeout())
    };
    let flow = RedirectFlow::new(
        MetadataCollector::new(enricher, config.enrichment.geolocation_timeout()),
        Arc::new(LookupClient::new(
            client,
            &api_base,
            config.redirect.short_code_max_length,
        )),
        reporter,
        NavigationTrigger::new(delay),
    );

    let ctx = ClientContext {
        user_agent: Some(concat!("redirector-resolve/", env!("CARGO_PKG_VERSION")).to_string()),
        ..Default::default()
    };

    let session = flow.session();
    let mut events = session.events();
    let printer = tokio::spawn(async move {
        while let Some(state) = events.recv().await {
            eprintln!("[{:>3}%] {}", state.progress(), state.name());
        }
    });

    let outcome = session
        .run(&location, &ctx, &ReportedLocator::new(None), &PrintNavigator)
        .await;
    drop(session);
    if let Err(e) = printer.await {
        warn!(error = %e, "State printer task failed");
    }

    match outcome {
        Ok(_) => Ok(()),
        Err(e) => bail!("{}", e),
    }
}
