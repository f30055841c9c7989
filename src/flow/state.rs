use serde::Serialize;

/// Where a redirect flow currently is.
///
/// `Redirecting` and `Failed` are terminal. Observers (progress displays,
/// logs) derive everything they show from this value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowState {
    Idle,
    Extracting,
    Collecting,
    Resolving,
    Tracking,
    Redirecting { destination: String },
    Failed { message: String },
}

impl FlowState {
    /// Progress percentage for display
    pub fn progress(&self) -> u8 {
        match self {
            FlowState::Idle => 0,
            FlowState::Extracting => 10,
            FlowState::Collecting => 20,
            FlowState::Resolving => 50,
            FlowState::Tracking => 80,
            FlowState::Redirecting { .. } => 100,
            FlowState::Failed { .. } => 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Redirecting { .. } | FlowState::Failed { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::Extracting => "extracting",
            FlowState::Collecting => "collecting",
            FlowState::Resolving => "resolving",
            FlowState::Tracking => "tracking",
            FlowState::Redirecting { .. } => "redirecting",
            FlowState::Failed { .. } => "failed",
        }
    }
}
