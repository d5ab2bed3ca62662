//! Orchestration state and consultation entities.

use crate::orchestration::flow_code::FlowSegment;
use crate::schedule::catalog::{PROCESSES_PER_SCHEDULE, ScheduleId};
use crate::schedule::mode::OrchestrationMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Default countdown for a consultation, in seconds.
pub const DEFAULT_CONSULTATION_TIMEOUT_SECS: u64 = 60;

/// A (schedule, process) coordinate in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub schedule: ScheduleId,
    pub process: u8,
}

impl Position {
    pub fn new(schedule: ScheduleId, process: u8) -> Self {
        debug_assert!((1..=PROCESSES_PER_SCHEDULE).contains(&process));
        Self { schedule, process }
    }

    pub fn is_last_process(&self) -> bool {
        self.process == PROCESSES_PER_SCHEDULE
    }

    pub fn process_name(&self) -> &'static str {
        self.schedule.process_name(self.process).unwrap_or_default()
    }

    pub fn segment(&self) -> FlowSegment {
        FlowSegment::visit(self.schedule, self.process)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}P{}", self.schedule.ordinal(), self.process)
    }
}

/// Identifier of a consultation, unique per engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConsultationId(pub u64);

impl fmt::Display for ConsultationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "consultation-{}", self.0)
    }
}

/// A pending human-input request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: ConsultationId,
    pub question: String,
    pub timeout_secs: u64,
    pub is_mandatory: bool,
    pub created_at: DateTime<Utc>,
    /// Set when a mandatory consultation's countdown has run out.
    pub expired: bool,
}

impl Consultation {
    pub fn new(
        id: ConsultationId,
        question: impl Into<String>,
        timeout_secs: u64,
        is_mandatory: bool,
    ) -> Self {
        Self {
            id,
            question: question.into(),
            timeout_secs,
            is_mandatory,
            created_at: Utc::now(),
            expired: false,
        }
    }

    /// Whether this consultation stops `advance`.
    pub fn blocks_advance(&self) -> bool {
        self.is_mandatory
    }
}

/// How a consultation ended, as seen by whoever raised it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "response", rename_all = "snake_case")]
pub enum ConsultationOutcome {
    /// The user answered.
    Responded(String),
    /// The user explicitly chose the default behavior.
    Skipped,
    /// The countdown ran out on an optional consultation.
    TimedOut,
    /// The run was stopped while the consultation was pending.
    Discarded,
}

impl ConsultationOutcome {
    pub fn response(&self) -> Option<&str> {
        match self {
            ConsultationOutcome::Responded(text) => Some(text),
            _ => None,
        }
    }

    /// Skip and timeout both mean "fall back to automatic behavior".
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            ConsultationOutcome::Skipped | ConsultationOutcome::TimedOut
        )
    }
}

/// Live state of one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationState {
    pub task: String,
    pub mode: OrchestrationMode,
    pub is_active: bool,
    pub current_schedule: ScheduleId,
    pub current_process: u8,
    pub completed_schedules: BTreeSet<ScheduleId>,
    pub pending_consultation: Option<Consultation>,
}

impl OrchestrationState {
    pub fn new(task: impl Into<String>, mode: OrchestrationMode) -> Self {
        Self {
            task: task.into(),
            mode,
            is_active: true,
            current_schedule: mode.first_schedule(),
            current_process: 1,
            completed_schedules: BTreeSet::new(),
            pending_consultation: None,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.current_schedule, self.current_process)
    }

    pub fn highest_completed(&self) -> Option<ScheduleId> {
        self.completed_schedules.iter().next_back().copied()
    }

    /// The furthest schedule the run may step into: the one right after the
    /// highest completed schedule, or the mode's first schedule.
    pub fn frontier(&self) -> Option<ScheduleId> {
        match self.highest_completed() {
            Some(highest) => self.mode.next_after(highest),
            None => Some(self.mode.first_schedule()),
        }
    }

    /// Whether every schedule of the mode has been completed.
    pub fn is_finished(&self) -> bool {
        self.mode
            .schedules()
            .iter()
            .all(|s| self.completed_schedules.contains(s))
    }
}
