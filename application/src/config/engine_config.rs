//! Engine configuration: timing and routing knobs for the orchestration engine.

use conductor_domain::{DEFAULT_CONSULTATION_TIMEOUT_SECS, ModelRouter, OrchestrationMode};
use std::time::Duration;

/// Static parameters of an [`OrchestrationEngine`](crate::engine::OrchestrationEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Mode used when a caller does not pick one.
    pub default_mode: OrchestrationMode,
    /// Countdown for consultations raised without an explicit timeout.
    pub consultation_timeout_secs: u64,
    /// How often the countdown publishes a tick event.
    pub tick_interval: Duration,
    /// Schedule → model routing (catalog defaults plus overrides).
    pub router: ModelRouter,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_mode: OrchestrationMode::Full,
            consultation_timeout_secs: DEFAULT_CONSULTATION_TIMEOUT_SECS,
            tick_interval: Duration::from_secs(1),
            router: ModelRouter::new(),
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_default_mode(mut self, mode: OrchestrationMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_consultation_timeout_secs(mut self, secs: u64) -> Self {
        self.consultation_timeout_secs = secs;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_router(mut self, router: ModelRouter) -> Self {
        self.router = router;
        self
    }
}
