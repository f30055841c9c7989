use reqwest::Client;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use super::navigation::{NavigationTrigger, Navigator};
use super::state::FlowState;
use super::FlowError;
use crate::config::Config;
use crate::extractor::{extract_short_code, RequestLocation};
use crate::metadata::{ClientContext, DeviceLocator, IpEnricher, MetadataCollector};
use crate::resolver::{LookupClient, Resolver};
use crate::tracking::{TrackingReporter, WebhookSink};

/// Extract → collect → resolve → track → navigate, strictly in order.
///
/// The flow itself is stateless and shared; each visit runs in its own
/// `FlowSession`.
#[derive(Clone)]
pub struct RedirectFlow {
    collector: MetadataCollector,
    resolver: Arc<dyn Resolver>,
    reporter: TrackingReporter,
    trigger: NavigationTrigger,
}

impl RedirectFlow {
    pub fn new(
        collector: MetadataCollector,
        resolver: Arc<dyn Resolver>,
        reporter: TrackingReporter,
        trigger: NavigationTrigger,
    ) -> Self {
        Self {
            collector,
            resolver,
            reporter,
            trigger,
        }
    }

    /// Wire the flow to the configured lookup API and tracking webhook
    pub fn from_config(config: &Config, client: Client) -> Self {
        let enricher = config
            .enrichment
            .enabled
            .then(|| IpEnricher::new(&config.enrichment, client.clone()));
        let collector =
            MetadataCollector::new(enricher, config.enrichment.geolocation_timeout());

        let resolver = Arc::new(LookupClient::new(
            client.clone(),
            &config.redirect.api_base_url,
            config.redirect.short_code_max_length,
        ));
        let reporter =
            TrackingReporter::new(Arc::new(WebhookSink::new(client, &config.redirect.webhook_url)))
                .with_timeout(config.redirect.tracking_timeout());

        Self::new(
            collector,
            resolver,
            reporter,
            NavigationTrigger::new(config.redirect.delay()),
        )
    }

    pub fn session(&self) -> FlowSession<'_> {
        let (state, _) = watch::channel(FlowState::Idle);
        FlowSession {
            flow: self,
            state,
            listeners: Mutex::new(Vec::new()),
        }
    }
}

/// One execution of the flow, observable through its state
pub struct FlowSession<'a> {
    flow: &'a RedirectFlow,
    state: watch::Sender<FlowState>,
    listeners: Mutex<Vec<mpsc::UnboundedSender<FlowState>>>,
}

impl FlowSession<'_> {
    /// Latest state only
    pub fn subscribe(&self) -> watch::Receiver<FlowState> {
        self.state.subscribe()
    }

    /// Every transition, in order
    pub fn events(&self) -> mpsc::UnboundedReceiver<FlowState> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    pub fn state(&self) -> FlowState {
        self.state.borrow().clone()
    }

    /// Run the flow for `location`. Running again (a retry) starts over
    /// from `Idle` with nothing carried over from the previous attempt.
    ///
    /// Returns the destination the navigator was sent to.
    pub async fn run(
        &self,
        location: &RequestLocation,
        ctx: &ClientContext,
        locator: &dyn DeviceLocator,
        navigator: &dyn Navigator,
    ) -> Result<String, FlowError> {
        self.transition(FlowState::Idle);

        match self.drive(location, ctx, locator, navigator).await {
            Ok(destination) => Ok(destination),
            Err(e) => {
                info!(error = %e, "Redirect flow failed");
                self.transition(FlowState::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        location: &RequestLocation,
        ctx: &ClientContext,
        locator: &dyn DeviceLocator,
        navigator: &dyn Navigator,
    ) -> Result<String, FlowError> {
        self.transition(FlowState::Extracting);
        let code = extract_short_code(location).ok_or(FlowError::MissingCode)?;
        debug!(short_code = %code, path = %location.path, "Short code extracted");

        self.transition(FlowState::Collecting);
        let metadata = self.flow.collector.collect(ctx, locator).await;

        self.transition(FlowState::Resolving);
        let result = self.flow.resolver.resolve(&code).await?;

        self.transition(FlowState::Tracking);
        self.flow.reporter.report(&result, &metadata, &code).await;

        let destination = result.original_url;
        self.transition(FlowState::Redirecting {
            destination: destination.clone(),
        });
        self.flow.trigger.fire(navigator, &destination).await;

        Ok(destination)
    }

    fn transition(&self, next: FlowState) {
        debug!(state = next.name(), "Flow transition");
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        listeners.retain(|tx| tx.send(next.clone()).is_ok());
        drop(listeners);
        self.state.send_replace(next);
    }
}
