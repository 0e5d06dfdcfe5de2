//! Orchestrator configuration

use std::time::Duration;

/// Quiet period before a burst of edits is rendered and persisted
pub const DEFAULT_EDIT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

/// Quiet period used while live mode is on
pub const DEFAULT_LIVE_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Configuration for the render orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Debounce window for edits
    pub edit_quiet_period: Duration,
    /// Shorter debounce window for live mode
    pub live_quiet_period: Duration,
    /// Start in live mode
    pub live: bool,
    /// Render event buffer per subscriber
    pub event_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            edit_quiet_period: DEFAULT_EDIT_QUIET_PERIOD,
            live_quiet_period: DEFAULT_LIVE_QUIET_PERIOD,
            live: false,
            event_capacity: 256,
        }
    }
}

impl OrchestratorConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the edit debounce window
    #[must_use]
    pub fn with_edit_quiet_period(mut self, period: Duration) -> Self {
        self.edit_quiet_period = period;
        self
    }

    /// Set the live-mode debounce window
    #[must_use]
    pub fn with_live_quiet_period(mut self, period: Duration) -> Self {
        self.live_quiet_period = period;
        self
    }

    /// Start in live mode
    #[must_use]
    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Debounce window for the given mode
    #[must_use]
    pub fn quiet_period(&self, live: bool) -> Duration {
        if live {
            self.live_quiet_period
        } else {
            self.edit_quiet_period
        }
    }
}
