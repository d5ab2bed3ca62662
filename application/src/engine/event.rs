//! Events emitted by the orchestration engine.
//!
//! Events form the output port from the engine to whatever renders or
//! records it. They are published after the engine lock is released, over an
//! unbounded channel and to the configured [`EventLogger`].

use crate::ports::event_logger::{EventLogger, NoEventLogger};
use conductor_domain::{
    ConsultationId, ConsultationOutcome, FlowSegment, Model, OrchestrationMode, Position,
    ScheduleId,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    // === Run lifecycle ===
    Started {
        task: String,
        mode: OrchestrationMode,
        flow_code: String,
    },
    Transitioned {
        from: Option<Position>,
        to: Position,
        segment: FlowSegment,
        flow_code: String,
    },
    /// The active schedule changed; carries the model it routes to.
    ScheduleChanged { schedule: ScheduleId, model: Model },
    ScheduleCompleted { schedule: ScheduleId },
    /// The last schedule of the mode was completed.
    Completed { flow_code: String },
    Stopped { flow_code: String },

    // === Consultation gate ===
    ConsultationRaised {
        id: ConsultationId,
        question: String,
        timeout_secs: u64,
        is_mandatory: bool,
    },
    /// Countdown side channel for display.
    ConsultationTick { id: ConsultationId, remaining_secs: u64 },
    /// A mandatory consultation's countdown ran out; it stays pending.
    ConsultationExpired { id: ConsultationId },
    ConsultationResolved {
        id: ConsultationId,
        outcome: ConsultationOutcome,
    },

    // === Process execution ===
    ModelChunk { model: Model, chunk: String },
}

impl EngineEvent {
    /// Event type identifier, matching the serialized `type` field.
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::Started { .. } => "started",
            EngineEvent::Transitioned { .. } => "transitioned",
            EngineEvent::ScheduleChanged { .. } => "schedule_changed",
            EngineEvent::ScheduleCompleted { .. } => "schedule_completed",
            EngineEvent::Completed { .. } => "completed",
            EngineEvent::Stopped { .. } => "stopped",
            EngineEvent::ConsultationRaised { .. } => "consultation_raised",
            EngineEvent::ConsultationTick { .. } => "consultation_tick",
            EngineEvent::ConsultationExpired { .. } => "consultation_expired",
            EngineEvent::ConsultationResolved { .. } => "consultation_resolved",
            EngineEvent::ModelChunk { .. } => "model_chunk",
        }
    }
}

/// Fan-out of engine events to a channel and an event logger.
#[derive(Clone)]
pub struct EventPublisher {
    tx: Option<mpsc::UnboundedSender<EngineEvent>>,
    logger: Arc<dyn EventLogger>,
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self {
            tx: None,
            logger: Arc::new(NoEventLogger),
        }
    }
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sender(mut self, tx: mpsc::UnboundedSender<EngineEvent>) -> Self {
        self.tx = Some(tx);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn publish(&self, event: EngineEvent) {
        self.logger.log(&event);
        if let Some(tx) = &self.tx {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(event);
        }
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = EngineEvent>) {
        for event in events {
            self.publish(event);
        }
    }
}
