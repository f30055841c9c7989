use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

/// Moves the visitor to the destination. Terminal: nothing meaningful
/// happens for the visitor afterwards.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, destination: &str);
}

/// Waits the fixed pre-redirect delay, then navigates
#[derive(Debug, Clone, Copy)]
pub struct NavigationTrigger {
    delay: Duration,
}

impl NavigationTrigger {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn fire(&self, navigator: &dyn Navigator, destination: &str) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        info!(destination = %destination, "Redirecting");
        navigator.navigate(destination).await;
    }
}

/// Remembers the destination so the caller can turn it into a response
#[derive(Debug, Default)]
pub struct CapturingNavigator {
    destination: Mutex<Option<String>>,
}

impl CapturingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destination(&self) -> Option<String> {
        self.destination
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl Navigator for CapturingNavigator {
    async fn navigate(&self, destination: &str) {
        let mut guard = self
            .destination
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(destination.to_string());
    }
}
