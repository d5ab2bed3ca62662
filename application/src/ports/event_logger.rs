//! Port for structured engine event logging.
//!
//! Defines the [`EventLogger`] trait for recording [`EngineEvent`]s to a
//! machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures every
//! transition and consultation in a replayable format (e.g. JSONL).

use crate::engine::event::EngineEvent;

/// Port for logging engine events to a structured log.
///
/// Synchronous and infallible; write failures are dropped.
pub trait EventLogger: Send + Sync {
    /// Record an engine event.
    fn log(&self, event: &EngineEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoEventLogger;

impl EventLogger for NoEventLogger {
    fn log(&self, _event: &EngineEvent) {}
}
