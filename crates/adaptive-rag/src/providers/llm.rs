//! LLM provider trait used by the model-backed judge

use async_trait::async_trait;
use crate::error::Result;

/// Shape the model is asked to answer in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// Constrained JSON output
    Json,
}

/// One completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instructions
    pub system: String,
    /// User turn
    pub prompt: String,
    pub format: ResponseFormat,
}

impl CompletionRequest {
    pub fn text(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            format: ResponseFormat::Text,
        }
    }

    pub fn json(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            format: ResponseFormat::Json,
        }
    }
}

/// Trait for text completion backends
///
/// Implementations:
/// - `OllamaClient`: Local Ollama server (llama3.2, phi3, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one completion and return the raw model text
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
