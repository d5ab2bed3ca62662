//! Orchestration engine
//!
//! [`OrchestrationEngine`] is the single owner of a [`Pipeline`]. Every
//! operation runs under one mutex; consultation countdowns run as separate
//! Tokio tasks that take the same mutex before touching the pending
//! consultation, so a countdown firing at the same moment as a manual
//! `respond`/`skip` resolves the consultation exactly once.
//!
//! Events are collected while the lock is held and published after it is
//! released. Publishing goes through a second `outbox` lock taken before the
//! core lock is dropped, so subscribers see events in the order the
//! operations ran.

pub mod event;
pub mod gate;

use crate::config::EngineConfig;
use conductor_domain::{
    Consultation, ConsultationId, ConsultationOutcome, FlowCode, Model, OrchestrationError,
    OrchestrationMode, OrchestrationState, Pipeline, ScheduleId, Transition,
};
use event::{EngineEvent, EventPublisher};
use gate::{ConsultationHandle, CountdownSink, GateSlot, run_countdown};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Parameters for `raise_consultation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsultationRequest {
    pub question: String,
    /// Falls back to the engine's configured timeout when `None`.
    pub timeout_secs: Option<u64>,
    pub is_mandatory: bool,
}

impl ConsultationRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            timeout_secs: None,
            is_mandatory: false,
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn mandatory(mut self, is_mandatory: bool) -> Self {
        self.is_mandatory = is_mandatory;
        self
    }
}

/// Read-only view of the engine for display layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    /// `None` until the first run starts.
    pub state: Option<OrchestrationState>,
    pub flow_code: String,
    pub current_model: Option<Model>,
    pub allowed_targets: Vec<ScheduleId>,
}

struct EngineCore {
    pipeline: Pipeline,
    gate: Option<GateSlot>,
    next_consultation_id: u64,
}

impl EngineCore {
    /// Resolve the gate slot, if any, with `outcome` and describe it.
    fn resolve_gate(&mut self, outcome: ConsultationOutcome) -> Option<EngineEvent> {
        let slot = self.gate.take()?;
        let id = slot.id;
        slot.resolve(outcome.clone());
        Some(EngineEvent::ConsultationResolved { id, outcome })
    }
}

struct EngineShared {
    core: Mutex<EngineCore>,
    outbox: Mutex<()>,
    config: EngineConfig,
    publisher: EventPublisher,
}

impl EngineShared {
    fn lock(&self) -> MutexGuard<'_, EngineCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Release `core` and publish `events` ahead of any later operation.
    fn publish_after(
        &self,
        core: MutexGuard<'_, EngineCore>,
        events: impl IntoIterator<Item = EngineEvent>,
    ) {
        let _outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
        drop(core);
        self.publisher.publish_all(events);
    }

    fn transition_events(&self, core: &EngineCore, transition: &Transition) -> Vec<EngineEvent> {
        let flow_code = core.pipeline.flow_code().render();
        let mut events = vec![EngineEvent::Transitioned {
            from: transition.from,
            to: transition.to,
            segment: transition.segment,
            flow_code: flow_code.clone(),
        }];
        if let Some(schedule) = transition.completed_schedule {
            events.push(EngineEvent::ScheduleCompleted { schedule });
        }
        if transition.finished {
            events.push(EngineEvent::Completed { flow_code });
        } else if transition.schedule_changed() {
            let schedule = transition.to.schedule;
            events.push(EngineEvent::ScheduleChanged {
                schedule,
                model: self.config.router.model_for(schedule),
            });
        }
        events
    }
}

impl CountdownSink for EngineShared {
    fn on_tick(&self, id: ConsultationId, remaining_secs: u64) {
        let core = self.lock();
        if core.gate.as_ref().is_none_or(|slot| slot.id != id) {
            return;
        }
        self.publish_after(core, [EngineEvent::ConsultationTick { id, remaining_secs }]);
    }

    fn on_elapsed(&self, id: ConsultationId) {
        let mut core = self.lock();
        if core.gate.as_ref().is_none_or(|slot| slot.id != id) {
            debug!("Countdown for {} elapsed after resolution, ignoring", id);
            return;
        }

        let mandatory = core
            .pipeline
            .pending_consultation()
            .is_some_and(|c| c.is_mandatory);
        let event = if mandatory {
            core.pipeline.mark_consultation_expired(id);
            EngineEvent::ConsultationExpired { id }
        } else {
            // The gate slot exists, so the consultation is pending.
            let _ = core.pipeline.take_consultation();
            match core.resolve_gate(ConsultationOutcome::TimedOut) {
                Some(event) => event,
                None => return,
            }
        };
        self.publish_after(core, [event]);

        if mandatory {
            warn!("Mandatory {} timed out; still waiting for a response", id);
        } else {
            info!("{} timed out, falling back to default behavior", id);
        }
    }
}

/// The orchestration engine: one live run, one pending consultation at most.
///
/// Cloning is cheap and every clone drives the same engine.
#[derive(Clone)]
pub struct OrchestrationEngine {
    shared: Arc<EngineShared>,
}

impl OrchestrationEngine {
    pub fn new(config: EngineConfig, publisher: EventPublisher) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                core: Mutex::new(EngineCore {
                    pipeline: Pipeline::new(),
                    gate: None,
                    next_consultation_id: 1,
                }),
                outbox: Mutex::new(()),
                config,
                publisher,
            }),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default(), EventPublisher::new())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    pub fn publisher(&self) -> &EventPublisher {
        &self.shared.publisher
    }

    // ==================== Pipeline operations ====================

    /// Start a run. Fails with `AlreadyActive` while another run is active.
    pub fn start(
        &self,
        task: impl Into<String>,
        mode: OrchestrationMode,
    ) -> Result<Transition, OrchestrationError> {
        let task = task.into();
        let mut core = self.shared.lock();
        let transition = core.pipeline.start(task.clone(), mode)?;
        let mut events = vec![EngineEvent::Started {
            task: task.clone(),
            mode,
            flow_code: core.pipeline.flow_code().render(),
        }];
        events.extend(self.shared.transition_events(&core, &transition));
        self.shared.publish_after(core, events);

        info!("Orchestration started in {} mode: {}", mode, task);
        Ok(transition)
    }

    /// Start a run in the configured default mode.
    pub fn start_default(&self, task: impl Into<String>) -> Result<Transition, OrchestrationError> {
        self.start(task, self.shared.config.default_mode)
    }

    /// Move one process forward.
    pub fn advance(&self) -> Result<Transition, OrchestrationError> {
        let mut core = self.shared.lock();
        let transition = core.pipeline.advance()?;
        let mut events = self.shared.transition_events(&core, &transition);
        if transition.finished {
            events.extend(core.resolve_gate(ConsultationOutcome::Discarded));
        }
        self.shared.publish_after(core, events);

        if transition.finished {
            info!("Orchestration completed at {}", transition.to);
        } else {
            debug!("Advanced to {}", transition.to);
        }
        Ok(transition)
    }

    /// Jump to a completed schedule, stay on the current one, or step onto
    /// the next one.
    pub fn navigate_to_schedule(&self, target: ScheduleId) -> Result<Transition, OrchestrationError> {
        let mut core = self.shared.lock();
        let transition = core.pipeline.navigate_to_schedule(target)?;
        let events = self.shared.transition_events(&core, &transition);
        self.shared.publish_after(core, events);

        debug!("Navigated to {}", target);
        Ok(transition)
    }

    /// Stop the active run. Returns `false` if nothing was active.
    ///
    /// A pending consultation is discarded without resolution; its raiser
    /// observes [`ConsultationOutcome::Discarded`].
    pub fn stop(&self) -> bool {
        let mut core = self.shared.lock();
        if core.pipeline.stop().is_none() {
            return false;
        }
        let mut events = Vec::new();
        events.extend(core.resolve_gate(ConsultationOutcome::Discarded));
        events.push(EngineEvent::Stopped {
            flow_code: core.pipeline.flow_code().render(),
        });
        self.shared.publish_after(core, events);

        info!("Orchestration stopped");
        true
    }

    // ==================== Consultation gate ====================

    /// Install a consultation and start its countdown.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn raise_consultation(
        &self,
        request: ConsultationRequest,
    ) -> Result<ConsultationHandle, OrchestrationError> {
        let timeout_secs = request
            .timeout_secs
            .unwrap_or(self.shared.config.consultation_timeout_secs);

        let mut core = self.shared.lock();
        let id = ConsultationId(core.next_consultation_id);
        let consultation =
            Consultation::new(id, request.question.clone(), timeout_secs, request.is_mandatory);
        core.pipeline.install_consultation(consultation)?;
        core.next_consultation_id += 1;

        let cancel = CancellationToken::new();
        let (tx, rx) = oneshot::channel();
        core.gate = Some(GateSlot::new(id, cancel.clone(), tx));

        // The countdown blocks on the core lock, so nothing it publishes can
        // overtake the raised event.
        let shared = Arc::clone(&self.shared);
        let tick = self.shared.config.tick_interval;
        tokio::spawn(async move {
            run_countdown(&*shared, id, timeout_secs, tick, cancel).await;
        });

        let event = EngineEvent::ConsultationRaised {
            id,
            question: request.question,
            timeout_secs,
            is_mandatory: request.is_mandatory,
        };
        self.shared.publish_after(core, [event]);

        info!(
            "{} raised ({}s, mandatory: {})",
            id, timeout_secs, request.is_mandatory
        );
        Ok(ConsultationHandle::new(id, rx))
    }

    /// Answer the pending consultation, mandatory or not.
    pub fn respond(&self, text: impl Into<String>) -> Result<Consultation, OrchestrationError> {
        let text = text.into();
        let mut core = self.shared.lock();
        let consultation = core.pipeline.take_consultation()?;
        let event = core.resolve_gate(ConsultationOutcome::Responded(text));
        self.shared.publish_after(core, event);

        info!("{} answered", consultation.id);
        Ok(consultation)
    }

    /// Dismiss an optional consultation, asking for default behavior.
    pub fn skip(&self) -> Result<Consultation, OrchestrationError> {
        let mut core = self.shared.lock();
        match core.pipeline.pending_consultation() {
            None => return Err(OrchestrationError::ConsultationNotPending),
            Some(c) if c.is_mandatory => return Err(OrchestrationError::SkipNotAllowed),
            Some(_) => {}
        }
        let consultation = core.pipeline.take_consultation()?;
        let event = core.resolve_gate(ConsultationOutcome::Skipped);
        self.shared.publish_after(core, event);

        info!("{} skipped", consultation.id);
        Ok(consultation)
    }

    // ==================== Observation ====================

    pub fn state(&self) -> Option<OrchestrationState> {
        self.shared.lock().pipeline.state().cloned()
    }

    pub fn flow_code(&self) -> FlowCode {
        self.shared.lock().pipeline.flow_code().clone()
    }

    pub fn is_active(&self) -> bool {
        self.shared.lock().pipeline.is_active()
    }

    pub fn pending_consultation(&self) -> Option<Consultation> {
        self.shared.lock().pipeline.pending_consultation().cloned()
    }

    pub fn can_navigate_to(&self, target: ScheduleId) -> bool {
        self.shared.lock().pipeline.can_navigate_to(target)
    }

    /// Model for the current schedule; `None` before the first run.
    pub fn current_model(&self) -> Option<Model> {
        let schedule = self.shared.lock().pipeline.state()?.current_schedule;
        Some(self.shared.config.router.model_for(schedule))
    }

    pub fn model_for(&self, schedule: ScheduleId) -> Model {
        self.shared.config.router.model_for(schedule)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let core = self.shared.lock();
        let state = core.pipeline.state().cloned();
        let current_model = state
            .as_ref()
            .map(|s| self.shared.config.router.model_for(s.current_schedule));
        EngineSnapshot {
            flow_code: core.pipeline.flow_code().render(),
            allowed_targets: core.pipeline.allowed_targets(),
            current_model,
            state,
        }
    }
}
