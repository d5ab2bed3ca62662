//! Project-rule consultation policy.
//!
//! Projects can require a human checkpoint at specific schedules or
//! processes (e.g. "approve before applying changes"). The engine never
//! evaluates this policy itself; callers look up the matching rule and pass
//! its `mandatory` flag to `raise_consultation`.

use crate::orchestration::state::Position;
use crate::schedule::catalog::ScheduleId;
use serde::{Deserialize, Serialize};

/// A checkpoint requirement for a schedule, or one process within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationRule {
    pub schedule: ScheduleId,
    /// Process within the schedule; `None` matches every process.
    pub process: Option<u8>,
    pub question: String,
    pub mandatory: bool,
    pub timeout_secs: Option<u64>,
}

impl ConsultationRule {
    pub fn matches(&self, position: Position) -> bool {
        self.schedule == position.schedule && self.process.is_none_or(|p| p == position.process)
    }

    /// More specific rules (with a process) rank above schedule-wide ones.
    fn specificity(&self) -> u8 {
        u8::from(self.process.is_some())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationPolicy {
    rules: Vec<ConsultationRule>,
}

impl ConsultationPolicy {
    pub fn new(rules: Vec<ConsultationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ConsultationRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule governing `position`, preferring process-specific rules and,
    /// among equals, the first declared.
    pub fn rule_for(&self, position: Position) -> Option<&ConsultationRule> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(position))
            .fold(None, |best: Option<&ConsultationRule>, rule| match best {
                Some(b) if b.specificity() >= rule.specificity() => Some(b),
                _ => Some(rule),
            })
    }

    pub fn is_mandatory(&self, position: Position) -> bool {
        self.rule_for(position).is_some_and(|rule| rule.mandatory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(schedule: ScheduleId, process: Option<u8>, mandatory: bool) -> ConsultationRule {
        ConsultationRule {
            schedule,
            process,
            question: format!("{schedule:?}/{process:?}"),
            mandatory,
            timeout_secs: None,
        }
    }

    #[test]
    fn test_empty_policy_matches_nothing() {
        let policy = ConsultationPolicy::default();
        assert!(policy.rule_for(Position::new(ScheduleId::Research, 1)).is_none());
        assert!(!policy.is_mandatory(Position::new(ScheduleId::Research, 1)));
    }

    #[test]
    fn test_schedule_wide_rule_matches_all_processes() {
        let policy = ConsultationPolicy::new(vec![rule(ScheduleId::Deliver, None, false)]);
        for process in 1..=3 {
            assert!(policy.rule_for(Position::new(ScheduleId::Deliver, process)).is_some());
        }
        assert!(policy.rule_for(Position::new(ScheduleId::Verify, 1)).is_none());
    }

    #[test]
    fn test_process_rule_wins_over_schedule_rule() {
        let policy = ConsultationPolicy::new(vec![
            rule(ScheduleId::Implement, None, false),
            rule(ScheduleId::Implement, Some(2), true),
        ]);
        assert!(policy.is_mandatory(Position::new(ScheduleId::Implement, 2)));
        assert!(!policy.is_mandatory(Position::new(ScheduleId::Implement, 1)));
    }

    #[test]
    fn test_first_declared_wins_among_equals() {
        let policy = ConsultationPolicy::new(vec![
            rule(ScheduleId::Implement, Some(2), false),
            rule(ScheduleId::Implement, Some(2), true),
        ]);
        assert!(!policy.is_mandatory(Position::new(ScheduleId::Implement, 2)));
    }
}
