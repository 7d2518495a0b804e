//! LLM provider trait for single-turn text completion

use async_trait::async_trait;

use crate::error::Result;

/// Trait for single-turn LLM completion.
///
/// Implementations:
/// - `OllamaLlm`: local Ollama server (phi3, llama3, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a prompt and return the raw response text.
    ///
    /// No conversation state is kept between calls. The call must be bounded
    /// by a provider-level timeout.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available.
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Model identifier in use.
    fn model(&self) -> &str;
}
