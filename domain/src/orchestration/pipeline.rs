//! Pipeline state machine.
//!
//! [`Pipeline`] owns the [`OrchestrationState`] and its [`FlowCode`] and
//! enforces which transitions are legal. It is purely synchronous; timing
//! and mutual exclusion belong to the application-layer engine that wraps it.
//!
//! ```text
//! inactive ──start──▶ (S_first, P1) ──advance──▶ (S, P+1) ... (S, P3)
//!                                                              │ advance
//!                          ┌────────── next schedule exists ◀──┤
//!                          ▼                                   ▼
//!                     (S_next, P1)                    inactive (terminal)
//! ```

use crate::core::error::OrchestrationError;
use crate::orchestration::flow_code::{FlowCode, FlowSegment};
use crate::orchestration::state::{Consultation, ConsultationId, OrchestrationState, Position};
use crate::schedule::catalog::ScheduleId;
use crate::schedule::mode::OrchestrationMode;

/// What a successful transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Option<Position>,
    pub to: Position,
    /// Segment appended to the flow code.
    pub segment: FlowSegment,
    /// Schedule that was completed by this transition, if any.
    pub completed_schedule: Option<ScheduleId>,
    /// The run reached its natural end.
    pub finished: bool,
}

impl Transition {
    /// Whether the active schedule differs before and after.
    pub fn schedule_changed(&self) -> bool {
        self.from.is_none_or(|from| from.schedule != self.to.schedule)
    }
}

/// Single-owner pipeline state machine.
#[derive(Debug, Default)]
pub struct Pipeline {
    state: Option<OrchestrationState>,
    flow: FlowCode,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current run state; `None` until the first `start`.
    pub fn state(&self) -> Option<&OrchestrationState> {
        self.state.as_ref()
    }

    pub fn flow_code(&self) -> &FlowCode {
        &self.flow
    }

    pub fn is_active(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.is_active)
    }

    fn active_state(&self) -> Result<&OrchestrationState, OrchestrationError> {
        self.state
            .as_ref()
            .filter(|s| s.is_active)
            .ok_or(OrchestrationError::NotActive)
    }

    fn active_state_mut(&mut self) -> Result<&mut OrchestrationState, OrchestrationError> {
        self.state
            .as_mut()
            .filter(|s| s.is_active)
            .ok_or(OrchestrationError::NotActive)
    }

    // ==================== Transitions ====================

    /// Begin a new run. A finished or stopped run is replaced.
    pub fn start(
        &mut self,
        task: impl Into<String>,
        mode: OrchestrationMode,
    ) -> Result<Transition, OrchestrationError> {
        if self.is_active() {
            return Err(OrchestrationError::AlreadyActive);
        }

        let state = OrchestrationState::new(task, mode);
        let to = state.position();
        self.state = Some(state);
        self.flow = FlowCode::new();
        self.flow.push(to.segment());

        Ok(Transition {
            from: None,
            to,
            segment: to.segment(),
            completed_schedule: None,
            finished: false,
        })
    }

    /// Move one process forward, rolling into the next schedule after the
    /// last process. Blocked only by a mandatory pending consultation.
    pub fn advance(&mut self) -> Result<Transition, OrchestrationError> {
        let state = self.active_state_mut()?;
        if state
            .pending_consultation
            .as_ref()
            .is_some_and(Consultation::blocks_advance)
        {
            return Err(OrchestrationError::ConsultationPending);
        }

        let from = state.position();
        if !from.is_last_process() {
            state.current_process += 1;
            let to = state.position();
            self.flow.push(to.segment());
            return Ok(Transition {
                from: Some(from),
                to,
                segment: to.segment(),
                completed_schedule: None,
                finished: false,
            });
        }

        state.completed_schedules.insert(from.schedule);
        let transition = match state.mode.next_after(from.schedule) {
            Some(next) => {
                state.current_schedule = next;
                state.current_process = 1;
                let to = state.position();
                Transition {
                    from: Some(from),
                    to,
                    segment: to.segment(),
                    completed_schedule: Some(from.schedule),
                    finished: false,
                }
            }
            None => {
                // An inactive run cannot be gated.
                state.is_active = false;
                state.pending_consultation = None;
                Transition {
                    from: Some(from),
                    to: from,
                    segment: FlowSegment::Complete,
                    completed_schedule: Some(from.schedule),
                    finished: true,
                }
            }
        };
        self.flow.push(transition.segment);
        Ok(transition)
    }

    /// Whether `target` is reachable: any completed schedule, the current
    /// one, or the frontier right after the highest completed schedule.
    pub fn can_navigate_to(&self, target: ScheduleId) -> bool {
        let Ok(state) = self.active_state() else {
            return false;
        };
        if !state.mode.includes(target) {
            return false;
        }
        state.completed_schedules.contains(&target)
            || state.current_schedule == target
            || state.frontier() == Some(target)
    }

    /// Schedules `navigate_to_schedule` would currently accept, in order.
    pub fn allowed_targets(&self) -> Vec<ScheduleId> {
        ScheduleId::ALL
            .into_iter()
            .filter(|id| self.can_navigate_to(*id))
            .collect()
    }

    /// Jump to `target` at process 1 without touching the completed set.
    pub fn navigate_to_schedule(
        &mut self,
        target: ScheduleId,
    ) -> Result<Transition, OrchestrationError> {
        let allowed = self.can_navigate_to(target);
        let state = self.active_state_mut()?;
        if !allowed {
            return Err(OrchestrationError::NavigationDenied {
                target,
                current: state.current_schedule,
            });
        }

        let from = state.position();
        state.current_schedule = target;
        state.current_process = 1;
        let to = state.position();
        self.flow.push(to.segment());

        Ok(Transition {
            from: Some(from),
            to,
            segment: to.segment(),
            completed_schedule: None,
            finished: false,
        })
    }

    /// Deactivate the run, returning the consultation that was discarded.
    ///
    /// Returns `None` and changes nothing if the run is already inactive.
    pub fn stop(&mut self) -> Option<Option<Consultation>> {
        let state = self.active_state_mut().ok()?;
        state.is_active = false;
        Some(state.pending_consultation.take())
    }

    // ==================== Consultation slot ====================

    pub fn pending_consultation(&self) -> Option<&Consultation> {
        self.state.as_ref()?.pending_consultation.as_ref()
    }

    /// Install a new consultation; at most one may be pending.
    pub fn install_consultation(
        &mut self,
        consultation: Consultation,
    ) -> Result<(), OrchestrationError> {
        let state = self.active_state_mut()?;
        if state.pending_consultation.is_some() {
            return Err(OrchestrationError::ConsultationPending);
        }
        state.pending_consultation = Some(consultation);
        Ok(())
    }

    /// Remove and return the pending consultation.
    pub fn take_consultation(&mut self) -> Result<Consultation, OrchestrationError> {
        self.state
            .as_mut()
            .and_then(|s| s.pending_consultation.take())
            .ok_or(OrchestrationError::ConsultationNotPending)
    }

    /// Flag the pending consultation `id` as expired. Returns `false` if a
    /// different (or no) consultation is pending.
    pub fn mark_consultation_expired(&mut self, id: ConsultationId) -> bool {
        match self
            .state
            .as_mut()
            .and_then(|s| s.pending_consultation.as_mut())
        {
            Some(consultation) if consultation.id == id => {
                consultation.expired = true;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(mode: OrchestrationMode) -> Pipeline {
        let mut pipeline = Pipeline::new();
        pipeline.start("refactor auth", mode).unwrap();
        pipeline
    }

    fn position(pipeline: &Pipeline) -> Position {
        pipeline.state().unwrap().position()
    }

    fn consultation(id: u64, mandatory: bool) -> Consultation {
        Consultation::new(ConsultationId(id), "approve?", 60, mandatory)
    }

    // ==================== start ====================

    #[test]
    fn test_start_initializes_first_schedule() {
        let pipeline = started(OrchestrationMode::Full);
        assert!(pipeline.is_active());
        assert_eq!(position(&pipeline), Position::new(ScheduleId::Research, 1));
        assert_eq!(pipeline.flow_code().render(), "S1P1");
    }

    #[test]
    fn test_start_respects_mode() {
        let pipeline = started(OrchestrationMode::InfiniteMap);
        assert_eq!(pipeline.flow_code().render(), "S2P1");
    }

    #[test]
    fn test_start_while_active_fails() {
        let mut pipeline = started(OrchestrationMode::Full);
        assert_eq!(
            pipeline.start("again", OrchestrationMode::Full),
            Err(OrchestrationError::AlreadyActive)
        );
        assert_eq!(pipeline.flow_code().len(), 1);
    }

    #[test]
    fn test_restart_after_stop_resets_flow() {
        let mut pipeline = started(OrchestrationMode::Full);
        pipeline.advance().unwrap();
        pipeline.stop();
        pipeline.start("next", OrchestrationMode::ExploreMap).unwrap();
        assert_eq!(pipeline.flow_code().render(), "S1P1");
        assert_eq!(pipeline.state().unwrap().task, "next");
    }

    // ==================== advance ====================

    #[test]
    fn test_advance_before_start_fails() {
        let mut pipeline = Pipeline::new();
        assert_eq!(pipeline.advance(), Err(OrchestrationError::NotActive));
    }

    #[test]
    fn test_three_advances_roll_into_next_schedule() {
        let mut pipeline = started(OrchestrationMode::Full);
        pipeline.advance().unwrap();
        pipeline.advance().unwrap();
        let transition = pipeline.advance().unwrap();

        assert_eq!(transition.completed_schedule, Some(ScheduleId::Research));
        assert!(transition.schedule_changed());
        assert_eq!(position(&pipeline), Position::new(ScheduleId::Design, 1));
        assert_eq!(pipeline.flow_code().render(), "S1P1→S1P2→S1P3→S2P1");
        assert!(
            pipeline
                .state()
                .unwrap()
                .completed_schedules
                .contains(&ScheduleId::Research)
        );
    }

    #[test]
    fn test_every_schedule_rolls_over_in_every_mode() {
        for mode in [
            OrchestrationMode::Full,
            OrchestrationMode::InfiniteMap,
            OrchestrationMode::ExploreMap,
        ] {
            let mut pipeline = started(mode);
            for schedule in mode.schedules() {
                assert_eq!(position(&pipeline), Position::new(*schedule, 1));
                pipeline.advance().unwrap();
                pipeline.advance().unwrap();
                let last = pipeline.advance().unwrap();
                assert_eq!(last.completed_schedule, Some(*schedule));
                match mode.next_after(*schedule) {
                    Some(next) => assert_eq!(position(&pipeline), Position::new(next, 1)),
                    None => {
                        assert!(last.finished);
                        assert!(!pipeline.is_active());
                    }
                }
            }
        }
    }

    #[test]
    fn test_natural_completion_is_terminal() {
        let mut pipeline = started(OrchestrationMode::ExploreMap);
        for _ in 0..6 {
            pipeline.advance().unwrap();
        }
        let state = pipeline.state().unwrap();
        assert!(!state.is_active);
        assert!(state.is_finished());
        assert_eq!(state.position(), Position::new(ScheduleId::Design, 3));
        assert_eq!(
            pipeline.flow_code().render(),
            "S1P1→S1P2→S1P3→S2P1→S2P2→S2P3→END"
        );
        assert_eq!(pipeline.advance(), Err(OrchestrationError::NotActive));
    }

    #[test]
    fn test_completion_clears_optional_consultation() {
        let mut pipeline = started(OrchestrationMode::ExploreMap);
        for _ in 0..5 {
            pipeline.advance().unwrap();
        }
        pipeline.install_consultation(consultation(4, false)).unwrap();
        assert!(pipeline.advance().unwrap().finished);
        assert!(pipeline.pending_consultation().is_none());
    }

    #[test]
    fn test_mandatory_consultation_blocks_advance() {
        let mut pipeline = started(OrchestrationMode::Full);
        pipeline.install_consultation(consultation(1, true)).unwrap();
        assert_eq!(
            pipeline.advance(),
            Err(OrchestrationError::ConsultationPending)
        );
        assert_eq!(pipeline.flow_code().len(), 1);

        pipeline.take_consultation().unwrap();
        assert!(pipeline.advance().is_ok());
    }

    #[test]
    fn test_optional_consultation_does_not_block_advance() {
        let mut pipeline = started(OrchestrationMode::Full);
        pipeline.install_consultation(consultation(1, false)).unwrap();
        pipeline.advance().unwrap();
        assert!(pipeline.pending_consultation().is_some());
    }

    // ==================== navigate ====================

    #[test]
    fn test_navigation_rule_at_start() {
        let pipeline = started(OrchestrationMode::Full);
        assert_eq!(pipeline.allowed_targets(), vec![ScheduleId::Research]);
    }

    #[test]
    fn test_navigation_back_and_one_forward() {
        let mut pipeline = started(OrchestrationMode::Full);
        for _ in 0..3 {
            pipeline.advance().unwrap();
        }
        // completed {S1}, current S2
        assert_eq!(
            pipeline.allowed_targets(),
            vec![ScheduleId::Research, ScheduleId::Design]
        );
        assert_eq!(
            pipeline.navigate_to_schedule(ScheduleId::Implement),
            Err(OrchestrationError::NavigationDenied {
                target: ScheduleId::Implement,
                current: ScheduleId::Design,
            })
        );

        let transition = pipeline.navigate_to_schedule(ScheduleId::Research).unwrap();
        assert_eq!(transition.to, Position::new(ScheduleId::Research, 1));
        assert_eq!(
            pipeline.flow_code().render(),
            "S1P1→S1P2→S1P3→S2P1→S1P1"
        );
        // Stepping forward again to the frontier is allowed.
        assert!(pipeline.can_navigate_to(ScheduleId::Design));
        assert!(!pipeline.can_navigate_to(ScheduleId::Implement));
        assert_eq!(
            pipeline.state().unwrap().completed_schedules.len(),
            1,
            "navigation never alters completed schedules"
        );
    }

    #[test]
    fn test_navigation_resets_process() {
        let mut pipeline = started(OrchestrationMode::Full);
        pipeline.advance().unwrap();
        pipeline.navigate_to_schedule(ScheduleId::Research).unwrap();
        assert_eq!(position(&pipeline), Position::new(ScheduleId::Research, 1));
        assert_eq!(pipeline.flow_code().render(), "S1P1→S1P2→S1P1");
    }

    #[test]
    fn test_navigation_outside_mode_is_denied() {
        let pipeline = started(OrchestrationMode::ExploreMap);
        assert!(!pipeline.can_navigate_to(ScheduleId::Deliver));
    }

    #[test]
    fn test_navigation_when_inactive_fails() {
        let mut pipeline = Pipeline::new();
        assert_eq!(
            pipeline.navigate_to_schedule(ScheduleId::Research),
            Err(OrchestrationError::NotActive)
        );
    }

    #[test]
    fn test_revisited_schedule_rolls_forward_again() {
        let mut pipeline = started(OrchestrationMode::Full);
        for _ in 0..6 {
            pipeline.advance().unwrap();
        }
        // completed {S1, S2}, current S3
        pipeline.navigate_to_schedule(ScheduleId::Research).unwrap();
        for _ in 0..3 {
            pipeline.advance().unwrap();
        }
        assert_eq!(position(&pipeline), Position::new(ScheduleId::Design, 1));
        assert_eq!(pipeline.state().unwrap().completed_schedules.len(), 2);
    }

    // ==================== stop ====================

    #[test]
    fn test_stop_discards_consultation_and_keeps_trace() {
        let mut pipeline = started(OrchestrationMode::Full);
        pipeline.advance().unwrap();
        pipeline.install_consultation(consultation(7, true)).unwrap();

        let discarded = pipeline.stop().unwrap();
        assert_eq!(discarded.map(|c| c.id), Some(ConsultationId(7)));
        assert!(!pipeline.is_active());
        assert!(pipeline.pending_consultation().is_none());
        assert_eq!(pipeline.flow_code().render(), "S1P1→S1P2");

        assert_eq!(pipeline.stop(), None);
    }

    // ==================== consultation slot ====================

    #[test]
    fn test_only_one_consultation_at_a_time() {
        let mut pipeline = started(OrchestrationMode::Full);
        pipeline.install_consultation(consultation(1, false)).unwrap();
        assert_eq!(
            pipeline.install_consultation(consultation(2, false)),
            Err(OrchestrationError::ConsultationPending)
        );
    }

    #[test]
    fn test_mark_expired_checks_id() {
        let mut pipeline = started(OrchestrationMode::Full);
        pipeline.install_consultation(consultation(3, true)).unwrap();
        assert!(!pipeline.mark_consultation_expired(ConsultationId(2)));
        assert!(pipeline.mark_consultation_expired(ConsultationId(3)));
        assert!(pipeline.pending_consultation().unwrap().expired);
    }

    #[test]
    fn test_take_without_pending_fails() {
        let mut pipeline = started(OrchestrationMode::Full);
        assert_eq!(
            pipeline.take_consultation(),
            Err(OrchestrationError::ConsultationNotPending)
        );
    }
}
