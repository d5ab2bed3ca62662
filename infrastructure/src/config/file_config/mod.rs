//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types via
//! [`FileConfig::to_engine_config`] and [`FileConfig::to_policy`].

mod consultation;
mod engine;
mod logging;
mod models;

pub use consultation::{FileConsultationConfig, FileConsultationRule};
pub use engine::FileEngineConfig;
pub use logging::FileLoggingConfig;
pub use models::FileModelsConfig;

use conductor_application::EngineConfig;
use conductor_domain::{ConfigIssue, ConsultationPolicy, ModelRouter};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Engine timing and default mode
    pub engine: FileEngineConfig,
    /// Per-schedule model overrides
    pub models: FileModelsConfig,
    /// Project consultation rules
    pub consultation: FileConsultationConfig,
    /// Event log output
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.engine.parse_default_mode().1);
        issues.extend(self.engine.parse_tick_interval().1);
        issues.extend(self.engine.timeout_issues());
        issues.extend(self.models.parse_overrides().1);
        issues.extend(self.consultation.to_policy().1);
        issues
    }

    /// Engine configuration with invalid values replaced by defaults.
    pub fn to_engine_config(&self) -> EngineConfig {
        let (mode, _) = self.engine.parse_default_mode();
        let (tick, _) = self.engine.parse_tick_interval();
        let (overrides, _) = self.models.parse_overrides();
        EngineConfig::default()
            .with_default_mode(mode)
            .with_consultation_timeout_secs(self.engine.consultation_timeout_secs)
            .with_tick_interval(tick)
            .with_router(ModelRouter::new().with_overrides(overrides))
    }

    /// Consultation policy built from the valid rules.
    pub fn to_policy(&self) -> ConsultationPolicy {
        self.consultation.to_policy().0
    }
}
