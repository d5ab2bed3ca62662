//! Prompt templates for pipeline processes

use crate::orchestration::state::Position;

/// Templates for generating the prompt of each process
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for a schedule
    pub fn process_system(position: Position) -> String {
        let schedule = position.schedule.schedule();
        format!(
            r#"You are working on the "{}" stage of a five-stage engineering pipeline.
Stay within the scope of the current step. Do not jump ahead to later stages.
Be concise, concrete, and state assumptions explicitly."#,
            schedule.name
        )
    }

    /// User prompt for the current process
    pub fn process_prompt(task: &str, position: Position, consultation: Option<&str>) -> String {
        let schedule = position.schedule.schedule();
        let mut prompt = format!(
            r#"Task: {}

Stage: {} ({} of 5)
Step: {} ({} of 3)
"#,
            task,
            schedule.name,
            schedule.ordinal(),
            position.process_name(),
            position.process
        );

        if let Some(answer) = consultation {
            prompt.push_str(&format!("\nUser guidance for this step:\n{}\n", answer));
        }

        prompt.push_str("\nComplete this step and summarize the result.");
        prompt
    }
}
