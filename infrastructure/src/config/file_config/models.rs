//! Per-schedule model overrides from TOML (`[models]` section)

use conductor_domain::{ConfigIssue, ConfigIssueCode, Model, ScheduleId, Severity};
use serde::{Deserialize, Serialize};

/// Per-schedule model overrides from TOML
///
/// Unset schedules use their catalog default.
///
/// # Example
///
/// ```toml
/// [models]
/// research = "claude-sonnet-4.5"
/// implement = "gpt-5.2-codex"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    pub research: Option<String>,
    pub design: Option<String>,
    pub implement: Option<String>,
    pub verify: Option<String>,
    pub deliver: Option<String>,
}

impl FileModelsConfig {
    fn field(&self, schedule: ScheduleId) -> Option<&String> {
        match schedule {
            ScheduleId::Research => self.research.as_ref(),
            ScheduleId::Design => self.design.as_ref(),
            ScheduleId::Implement => self.implement.as_ref(),
            ScheduleId::Verify => self.verify.as_ref(),
            ScheduleId::Deliver => self.deliver.as_ref(),
        }
    }

    /// Parse all overrides, collecting issues for empty names.
    ///
    /// Unknown names are accepted as `Model::Custom`.
    pub fn parse_overrides(&self) -> (Vec<(ScheduleId, Model)>, Vec<ConfigIssue>) {
        let mut overrides = Vec::new();
        let mut issues = Vec::new();

        for schedule in ScheduleId::ALL {
            let Some(value) = self.field(schedule) else {
                continue;
            };
            let field = schedule.name().to_lowercase();
            if value.trim().is_empty() {
                issues.push(ConfigIssue {
                    severity: Severity::Error,
                    code: ConfigIssueCode::EmptyModelName {
                        field: field.clone(),
                    },
                    message: format!("models.{}: model name cannot be empty", field),
                });
                continue;
            }
            overrides.push((schedule, Model::from(value.trim())));
        }

        (overrides, issues)
    }
}
