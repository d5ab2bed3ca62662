//! Infrastructure layer for conductor
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration file loading and
//! structured event logging.

pub mod config;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileConsultationConfig, FileConsultationRule, FileEngineConfig,
    FileLoggingConfig, FileModelsConfig,
};
pub use logging::{JsonlEventLogger, init_tracing};
