//! Logging configuration from TOML (`[logging]` section)

use crate::logging::JsonlEventLogger;
use conductor_application::{EventLogger, NoEventLogger};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Raw logging configuration from TOML
///
/// # Example
///
/// ```toml
/// [logging]
/// event_log = ".conductor/events.jsonl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL engine event log; disabled when unset.
    pub event_log: Option<PathBuf>,
}

impl FileLoggingConfig {
    /// The configured event logger, or a no-op one if unset or unopenable.
    pub fn event_logger(&self) -> Arc<dyn EventLogger> {
        match self.event_log.as_ref().and_then(JsonlEventLogger::new) {
            Some(logger) => Arc::new(logger),
            None => Arc::new(NoEventLogger),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_application::EngineEvent;

    #[test]
    fn test_event_logger_writes_to_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let config = FileLoggingConfig {
            event_log: Some(path.clone()),
        };

        let logger = config.event_logger();
        logger.log(&EngineEvent::Completed {
            flow_code: "END".to_string(),
        });
        drop(logger);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"type\":\"completed\""));
    }

    #[test]
    fn test_event_logger_defaults_to_noop() {
        let logger = FileLoggingConfig::default().event_logger();
        logger.log(&EngineEvent::Completed {
            flow_code: String::new(),
        });
    }
}
