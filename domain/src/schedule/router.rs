//! Schedule → execution model routing.

use super::catalog::ScheduleId;
use crate::core::error::OrchestrationError;
use crate::core::model::Model;
use std::collections::HashMap;

/// Resolves the execution model for a schedule.
///
/// Without overrides this is a direct lookup of the catalog's default
/// model. Overrides come from configuration and replace the default for
/// individual schedules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRouter {
    overrides: HashMap<ScheduleId, Model>,
}

impl ModelRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, schedule: ScheduleId, model: Model) -> Self {
        self.overrides.insert(schedule, model);
        self
    }

    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = (ScheduleId, Model)>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    pub fn model_for(&self, schedule: ScheduleId) -> Model {
        self.overrides
            .get(&schedule)
            .cloned()
            .unwrap_or_else(|| schedule.schedule().default_model())
    }

    /// Lookup by raw ordinal; anything outside `1..=5` is rejected.
    pub fn model_for_ordinal(&self, ordinal: u8) -> Result<Model, OrchestrationError> {
        ScheduleId::from_ordinal(ordinal).map(|id| self.model_for(id))
    }

    pub fn is_overridden(&self, schedule: ScheduleId) -> bool {
        self.overrides.contains_key(&schedule)
    }
}
