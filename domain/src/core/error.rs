//! Domain error types

use crate::schedule::catalog::ScheduleId;
use thiserror::Error;

/// Errors signaled synchronously by pipeline and consultation operations.
///
/// None of these are transient: they describe caller misuse or a transition
/// the workflow does not allow, so nothing retries them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    #[error("An orchestration is already active")]
    AlreadyActive,

    #[error("No orchestration is active")]
    NotActive,

    #[error("A consultation is pending and blocks progress")]
    ConsultationPending,

    #[error("Navigation to {target} denied (current schedule: {current})")]
    NavigationDenied {
        target: ScheduleId,
        current: ScheduleId,
    },

    #[error("No consultation is pending")]
    ConsultationNotPending,

    #[error("Mandatory consultations cannot be skipped")]
    SkipNotAllowed,

    #[error("Invalid schedule ordinal: {0} (expected 1..=5)")]
    InvalidSchedule(u8),
}

impl OrchestrationError {
    /// Whether this error means the pipeline is waiting on a human.
    pub fn is_consultation_block(&self) -> bool {
        matches!(self, OrchestrationError::ConsultationPending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_denied_display() {
        let error = OrchestrationError::NavigationDenied {
            target: ScheduleId::Verify,
            current: ScheduleId::Design,
        };
        assert_eq!(
            error.to_string(),
            "Navigation to S4 Verify denied (current schedule: S2 Design)"
        );
    }

    #[test]
    fn test_is_consultation_block() {
        assert!(OrchestrationError::ConsultationPending.is_consultation_block());
        assert!(!OrchestrationError::NotActive.is_consultation_block());
        assert!(!OrchestrationError::SkipNotAllowed.is_consultation_block());
    }

    #[test]
    fn test_invalid_schedule_display() {
        assert_eq!(
            OrchestrationError::InvalidSchedule(7).to_string(),
            "Invalid schedule ordinal: 7 (expected 1..=5)"
        );
    }
}
