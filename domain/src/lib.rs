//! Domain layer for conductor
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Schedules and Processes
//!
//! A run walks a fixed pipeline of five **schedules** (Research, Design,
//! Implement, Verify, Deliver), each made of three ordered **processes**.
//! The [`OrchestrationMode`] picks which schedules participate.
//!
//! ## Flow Code
//!
//! Every transition appends one segment to the run's [`FlowCode`], a compact
//! trace such as `S1P1→S1P2→S1P3→S2P1`.
//!
//! ## Consultations
//!
//! A [`Consultation`] is a human-input checkpoint. Mandatory ones block
//! advancement until answered; optional ones fall back automatically.

pub mod config;
pub mod core;
pub mod orchestration;
pub mod prompt;
pub mod schedule;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::{error::OrchestrationError, model::Model};
pub use orchestration::{
    flow_code::{FlowCode, FlowSegment},
    pipeline::{Pipeline, Transition},
    policy::{ConsultationPolicy, ConsultationRule},
    state::{
        Consultation, ConsultationId, ConsultationOutcome, DEFAULT_CONSULTATION_TIMEOUT_SECS,
        OrchestrationState, Position,
    },
};
pub use prompt::PromptTemplate;
pub use schedule::{
    catalog::{PROCESSES_PER_SCHEDULE, Schedule, ScheduleId, catalog},
    mode::OrchestrationMode,
    router::ModelRouter,
};
pub use session::stream::StreamEvent;
