/*!
 * Provider implementations for the language models behind content generation.
 *
 * This module contains client implementations for various LLM providers:
 * - Ollama: Local LLM server
 * - Anthropic: Anthropic API integration
 * - Mock: deterministic canned responses for tests and dry runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod ollama;

/// A single prompt sent to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System prompt guiding the model
    pub system: String,
    /// User prompt
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Ask the provider to constrain output to JSON when it can
    pub json_output: bool,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature,
            json_output: false,
        }
    }

    /// Request JSON-only output
    pub fn json(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Text returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub text: String,
}

/// Common trait for all LLM providers
///
/// Object safe so the pipeline can hold any provider behind `Arc<dyn Provider>`.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Shorten a response body for log and error messages
pub(crate) fn preview(text: &str) -> String {
    const LIMIT: usize = 500;
    if text.chars().count() > LIMIT {
        format!("{}...", text.chars().take(LIMIT).collect::<String>())
    } else {
        text.to_string()
    }
}
