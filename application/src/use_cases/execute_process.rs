//! Execute Process use case.
//!
//! Drives the current process of the active run: checks the consultation
//! policy, waits for the human checkpoint if one applies, then sends the
//! process prompt to the schedule's model and forwards streamed chunks as
//! [`EngineEvent::ModelChunk`].

use crate::engine::event::EngineEvent;
use crate::engine::{ConsultationRequest, OrchestrationEngine};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use conductor_domain::{
    ConsultationOutcome, ConsultationPolicy, Model, OrchestrationError, Position, PromptTemplate,
    Transition,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ExecuteProcessError {
    #[error("Orchestration error: {0}")]
    Orchestration(#[from] OrchestrationError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The run was stopped (or replaced) while the process was executing.
    #[error("Run stopped during {0}")]
    Stopped(Position),
}

/// Result of one executed process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub position: Position,
    pub model: Model,
    /// How the checkpoint ended, if the policy raised one.
    pub consultation: Option<ConsultationOutcome>,
    pub response: String,
}

pub struct ExecuteProcessUseCase {
    gateway: Arc<dyn LlmGateway>,
    engine: OrchestrationEngine,
    policy: ConsultationPolicy,
}

impl Clone for ExecuteProcessUseCase {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            engine: self.engine.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl ExecuteProcessUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, engine: OrchestrationEngine) -> Self {
        Self {
            gateway,
            engine,
            policy: ConsultationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConsultationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn engine(&self) -> &OrchestrationEngine {
        &self.engine
    }

    /// Execute the current process without moving the pipeline.
    pub async fn execute(&self) -> Result<ProcessOutput, ExecuteProcessError> {
        let state = self
            .engine
            .state()
            .filter(|s| s.is_active)
            .ok_or(OrchestrationError::NotActive)?;
        let position = state.position();

        let consultation = match self.policy.rule_for(position) {
            Some(rule) => {
                let mut request =
                    ConsultationRequest::new(rule.question.clone()).mandatory(rule.mandatory);
                if let Some(secs) = rule.timeout_secs {
                    request = request.with_timeout_secs(secs);
                }
                let handle = self.engine.raise_consultation(request)?;
                debug!("Waiting on {} at {}", handle.id(), position);
                let outcome = handle.outcome().await;
                if outcome == ConsultationOutcome::Discarded {
                    return Err(ExecuteProcessError::Stopped(position));
                }
                Some(outcome)
            }
            None => None,
        };

        let model = self.engine.model_for(position.schedule);
        info!("Executing {} ({}) with {}", position, position.process_name(), model);

        let system_prompt = PromptTemplate::process_system(position);
        let prompt = PromptTemplate::process_prompt(
            &state.task,
            position,
            consultation.as_ref().and_then(ConsultationOutcome::response),
        );

        let session = self
            .gateway
            .create_session_with_system_prompt(&model, &system_prompt)
            .await?;
        let stream = session.send_streaming(&prompt).await?;

        let publisher = self.engine.publisher().clone();
        let response = stream
            .collect_text_with(|chunk| {
                publisher.publish(EngineEvent::ModelChunk {
                    model: model.clone(),
                    chunk: chunk.to_string(),
                });
            })
            .await?;

        let still_here = self
            .engine
            .state()
            .is_some_and(|s| s.is_active && s.position() == position);
        if !still_here {
            return Err(ExecuteProcessError::Stopped(position));
        }

        debug!("{} produced {} bytes", position, response.len());
        Ok(ProcessOutput {
            position,
            model,
            consultation,
            response,
        })
    }

    /// Execute the current process, then advance past it.
    pub async fn execute_and_advance(
        &self,
    ) -> Result<(ProcessOutput, Transition), ExecuteProcessError> {
        let output = self.execute().await?;
        let transition = self.engine.advance()?;
        Ok((output, transition))
    }
}
