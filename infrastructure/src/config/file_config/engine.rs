//! Engine configuration from TOML (`[engine]` section)

use conductor_domain::{ConfigIssue, ConfigIssueCode, OrchestrationMode, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Raw engine configuration from TOML
///
/// # Example
///
/// ```toml
/// [engine]
/// default_mode = "full"              # "full", "infinite-map", "explore-map"
/// consultation_timeout_secs = 60
/// tick_interval_ms = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    pub default_mode: String,
    /// Fallback timeout for consultations that don't set their own
    pub consultation_timeout_secs: u64,
    /// Countdown display granularity
    pub tick_interval_ms: u64,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            default_mode: "full".to_string(),
            consultation_timeout_secs: conductor_domain::DEFAULT_CONSULTATION_TIMEOUT_SECS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl FileEngineConfig {
    /// Parse default_mode, falling back to `full` with a warning.
    pub fn parse_default_mode(&self) -> (OrchestrationMode, Vec<ConfigIssue>) {
        match self.default_mode.parse::<OrchestrationMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => {
                let issue = ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: "engine.default_mode".to_string(),
                        value: self.default_mode.clone(),
                        valid_values: vec![
                            "full".to_string(),
                            "infinite-map".to_string(),
                            "explore-map".to_string(),
                        ],
                    },
                    message: format!(
                        "engine.default_mode: unknown value '{}', falling back to 'full'",
                        self.default_mode
                    ),
                };
                (OrchestrationMode::default(), vec![issue])
            }
        }
    }

    /// Tick interval; zero cannot drive a countdown and falls back to the default.
    pub fn parse_tick_interval(&self) -> (Duration, Vec<ConfigIssue>) {
        if self.tick_interval_ms > 0 {
            return (Duration::from_millis(self.tick_interval_ms), vec![]);
        }
        let issue = ConfigIssue {
            severity: Severity::Error,
            code: ConfigIssueCode::InvalidConstraint {
                field: "engine.tick_interval_ms".to_string(),
                reason: "must be greater than 0".to_string(),
            },
            message: format!(
                "engine.tick_interval_ms: must be greater than 0, using {}",
                DEFAULT_TICK_INTERVAL_MS
            ),
        };
        (Duration::from_millis(DEFAULT_TICK_INTERVAL_MS), vec![issue])
    }

    /// A zero timeout is legal but expires every consultation immediately.
    pub fn timeout_issues(&self) -> Vec<ConfigIssue> {
        if self.consultation_timeout_secs > 0 {
            return vec![];
        }
        vec![ConfigIssue {
            severity: Severity::Warning,
            code: ConfigIssueCode::InvalidConstraint {
                field: "engine.consultation_timeout_secs".to_string(),
                reason: "is 0".to_string(),
            },
            message: "engine.consultation_timeout_secs: 0 expires consultations immediately"
                .to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_mode_aliases() {
        let config = FileEngineConfig {
            default_mode: "explore".to_string(),
            ..Default::default()
        };
        let (mode, issues) = config.parse_default_mode();
        assert_eq!(mode, OrchestrationMode::ExploreMap);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_parse_default_mode_unknown_falls_back() {
        let config = FileEngineConfig {
            default_mode: "sideways".to_string(),
            ..Default::default()
        };
        let (mode, issues) = config.parse_default_mode();
        assert_eq!(mode, OrchestrationMode::Full);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_zero_tick_interval_is_error() {
        let config = FileEngineConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        let (interval, issues) = config.parse_tick_interval();
        assert_eq!(interval, Duration::from_secs(1));
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_zero_timeout_warns() {
        let config = FileEngineConfig {
            consultation_timeout_secs: 0,
            ..Default::default()
        };
        let issues = config.timeout_issues();
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
        assert!(FileEngineConfig::default().timeout_issues().is_empty());
    }
}
