/*!
 * Content generation stages backed by a language model.
 *
 * Three capabilities feed the pipeline, each behind its own trait so tests
 * and alternative backends can stand in:
 * - `TutorGenerator`: question to worked explanation
 * - `ScriptGenerator`: concept to animation script
 * - `NarrationGenerator`: script to narration document
 *
 * `LlmGenerator` implements all three on top of any `Provider`.
 */

use async_trait::async_trait;
use log::{debug, info};
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::GenerationConfig;
use crate::errors::GenerationError;
use crate::narration::NarrationDocument;
use crate::providers::{CompletionRequest, Provider};

pub mod prompts;
pub mod steps;

pub use steps::{build_concept, split_into_lines, strip_code_fences, ExplanationSteps};

/// Produces a worked explanation for a question
#[async_trait]
pub trait TutorGenerator: Send + Sync + Debug {
    async fn explain(&self, question: &str) -> Result<String, GenerationError>;
}

/// Produces an animation script for a concept
#[async_trait]
pub trait ScriptGenerator: Send + Sync + Debug {
    async fn generate_script(&self, concept: &str) -> Result<String, GenerationError>;
}

/// Produces narration for an animation script
#[async_trait]
pub trait NarrationGenerator: Send + Sync + Debug {
    async fn generate_narration(&self, script: &str) -> Result<NarrationDocument, GenerationError>;
}

/// Generator that prompts a language model for every stage
#[derive(Debug, Clone)]
pub struct LlmGenerator {
    provider: Arc<dyn Provider>,
    settings: GenerationConfig,
}

impl LlmGenerator {
    pub fn new(provider: Arc<dyn Provider>, settings: GenerationConfig) -> Self {
        Self { provider, settings }
    }

    fn require_input<'a>(input: &'a str, what: &str) -> Result<&'a str, GenerationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(GenerationError::InvalidInput(format!("{} must be a non-empty string", what)));
        }
        Ok(trimmed)
    }
}

#[async_trait]
impl TutorGenerator for LlmGenerator {
    async fn explain(&self, question: &str) -> Result<String, GenerationError> {
        let question = Self::require_input(question, "question")?;
        info!("Generating explanation for: {}", question);

        let request = CompletionRequest::new(prompts::TUTOR_SYSTEM_PROMPT, question, self.settings.tutor_temperature);
        let response = self.provider.complete(request).await?;

        let text = response.text.trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::EmptyOutput("explanation"));
        }
        Ok(text)
    }
}

#[async_trait]
impl ScriptGenerator for LlmGenerator {
    async fn generate_script(&self, concept: &str) -> Result<String, GenerationError> {
        let concept = Self::require_input(concept, "concept")?;
        info!("Generating animation script...");

        let request = CompletionRequest::new(prompts::SCRIPT_SYSTEM_PROMPT, concept, self.settings.script_temperature);
        let response = self.provider.complete(request).await?;

        let script = strip_code_fences(&response.text);
        if script.is_empty() {
            return Err(GenerationError::EmptyOutput("script"));
        }
        debug!("Generated script of {} lines", script.lines().count());
        Ok(script)
    }
}

#[async_trait]
impl NarrationGenerator for LlmGenerator {
    async fn generate_narration(&self, script: &str) -> Result<NarrationDocument, GenerationError> {
        let script = Self::require_input(script, "script")?;
        info!("Generating narration...");

        let request = CompletionRequest::new(prompts::NARRATION_SYSTEM_PROMPT, script, self.settings.narration_temperature).json();
        let response = self.provider.complete(request).await?;

        Ok(NarrationDocument::parse(&response.text)?)
    }
}
