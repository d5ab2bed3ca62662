//! Application layer for conductor
//!
//! This crate contains the orchestration engine, use cases, port definitions,
//! and application configuration. It depends only on the domain layer.

pub mod config;
pub mod engine;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::{
    ConsultationRequest, EngineSnapshot, OrchestrationEngine,
    event::{EngineEvent, EventPublisher},
    gate::ConsultationHandle,
};
pub use ports::{
    event_logger::{EventLogger, NoEventLogger},
    llm_gateway::{GatewayError, LlmGateway, LlmSession, StreamHandle},
};
pub use use_cases::execute_process::{ExecuteProcessError, ExecuteProcessUseCase, ProcessOutput};
