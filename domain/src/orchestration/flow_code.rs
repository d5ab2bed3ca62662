//! Flow code: the compact trace of the path taken through the pipeline.
//!
//! A flow code is an append-only list of [`FlowSegment`]s rendered joined by
//! [`FlowCode::SEPARATOR`], e.g. `S1P1→S1P2→S1P3→S2P1`. Backward navigation
//! shows up as repeated segments; nothing is ever collapsed or removed.

use crate::schedule::catalog::ScheduleId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One recorded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowSegment {
    /// The pipeline moved to (schedule, process).
    Visit { schedule: ScheduleId, process: u8 },
    /// The last process of the last schedule was advanced past.
    Complete,
}

impl FlowSegment {
    pub fn visit(schedule: ScheduleId, process: u8) -> Self {
        FlowSegment::Visit { schedule, process }
    }
}

impl fmt::Display for FlowSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowSegment::Visit { schedule, process } => {
                write!(f, "S{}P{}", schedule.ordinal(), process)
            }
            FlowSegment::Complete => write!(f, "END"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowCode {
    segments: Vec<FlowSegment>,
}

impl FlowCode {
    pub const SEPARATOR: &'static str = "→";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: FlowSegment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[FlowSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&FlowSegment> {
        self.segments.last()
    }

    /// Render the trace string.
    pub fn render(&self) -> String {
        self.segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(Self::SEPARATOR)
    }
}

impl fmt::Display for FlowCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
