pub mod navigation;
pub mod orchestrator;
pub mod state;

use thiserror::Error;

use crate::resolver::ResolveError;

pub use navigation::{CapturingNavigator, NavigationTrigger, Navigator};
pub use orchestrator::{FlowSession, RedirectFlow};
pub use state::FlowState;

/// Errors that stop the flow and are shown to the visitor
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Invalid URL code. Expected format: domain.com/nYRU4u")]
    MissingCode,
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
