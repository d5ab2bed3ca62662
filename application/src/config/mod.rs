//! Application-level configuration.
//!
//! - [`EngineConfig`]: engine timing, default mode and model routing

pub mod engine_config;

pub use engine_config::EngineConfig;
