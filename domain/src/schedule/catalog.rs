//! Static catalog of the five pipeline schedules.
//!
//! The catalog is closed and known at compile time, so each schedule is a
//! [`ScheduleId`] variant and its description is a table lookup rather than a
//! trait object.

use crate::core::error::OrchestrationError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of processes every schedule is made of.
pub const PROCESSES_PER_SCHEDULE: u8 = 3;

/// One of the five fixed pipeline stages, ordered by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ScheduleId {
    Research,
    Design,
    Implement,
    Verify,
    Deliver,
}

impl ScheduleId {
    /// All schedules in ordinal order.
    pub const ALL: [ScheduleId; 5] = [
        ScheduleId::Research,
        ScheduleId::Design,
        ScheduleId::Implement,
        ScheduleId::Verify,
        ScheduleId::Deliver,
    ];

    /// Ordinal in `1..=5`.
    pub fn ordinal(self) -> u8 {
        match self {
            ScheduleId::Research => 1,
            ScheduleId::Design => 2,
            ScheduleId::Implement => 3,
            ScheduleId::Verify => 4,
            ScheduleId::Deliver => 5,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Result<Self, OrchestrationError> {
        match ordinal {
            1 => Ok(ScheduleId::Research),
            2 => Ok(ScheduleId::Design),
            3 => Ok(ScheduleId::Implement),
            4 => Ok(ScheduleId::Verify),
            5 => Ok(ScheduleId::Deliver),
            other => Err(OrchestrationError::InvalidSchedule(other)),
        }
    }

    /// The catalog entry describing this schedule.
    pub fn schedule(self) -> &'static Schedule {
        &CATALOG[usize::from(self.ordinal() - 1)]
    }

    pub fn name(self) -> &'static str {
        self.schedule().name
    }

    /// Name of the process at `process` (1-based), if it exists.
    pub fn process_name(self, process: u8) -> Option<&'static str> {
        let index = usize::from(process.checked_sub(1)?);
        self.schedule().processes.get(index).copied()
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{} {}", self.ordinal(), self.name())
    }
}

impl TryFrom<u8> for ScheduleId {
    type Error = OrchestrationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ScheduleId::from_ordinal(value)
    }
}

impl From<ScheduleId> for u8 {
    fn from(id: ScheduleId) -> Self {
        id.ordinal()
    }
}

impl std::str::FromStr for ScheduleId {
    type Err = String;

    /// Accepts an ordinal (`"3"`, `"s3"`) or a schedule name (`"implement"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let digits = lower.strip_prefix('s').unwrap_or(&lower);
        if let Ok(ordinal) = digits.parse::<u8>() {
            return ScheduleId::from_ordinal(ordinal).map_err(|e| e.to_string());
        }
        ScheduleId::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(&lower))
            .ok_or_else(|| format!("Invalid schedule: {}", s))
    }
}

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: &'static str,
    /// Icon identifier for display layers.
    pub icon: &'static str,
    pub processes: [&'static str; PROCESSES_PER_SCHEDULE as usize],
    default_model: Model,
}

impl Schedule {
    pub fn ordinal(&self) -> u8 {
        self.id.ordinal()
    }

    /// The execution model this schedule runs on unless overridden.
    pub fn default_model(&self) -> Model {
        self.default_model.clone()
    }
}

static CATALOG: [Schedule; 5] = [
    Schedule {
        id: ScheduleId::Research,
        name: "Research",
        icon: "🔍",
        processes: ["Gather Context", "Analyze Requirements", "Identify Constraints"],
        default_model: Model::ClaudeSonnet45,
    },
    Schedule {
        id: ScheduleId::Design,
        name: "Design",
        icon: "📐",
        processes: ["Draft Approach", "Evaluate Alternatives", "Finalize Plan"],
        default_model: Model::ClaudeOpus46,
    },
    Schedule {
        id: ScheduleId::Implement,
        name: "Implement",
        icon: "🛠",
        processes: ["Scaffold", "Apply Changes", "Self Check"],
        default_model: Model::Gpt52Codex,
    },
    Schedule {
        id: ScheduleId::Verify,
        name: "Verify",
        icon: "🧪",
        processes: ["Write Tests", "Run Checks", "Review Diff"],
        default_model: Model::ClaudeSonnet46,
    },
    Schedule {
        id: ScheduleId::Deliver,
        name: "Deliver",
        icon: "📦",
        processes: ["Summarize", "Document", "Hand Off"],
        default_model: Model::ClaudeHaiku45,
    },
];

/// The full catalog in ordinal order.
pub fn catalog() -> &'static [Schedule] {
    &CATALOG
}
