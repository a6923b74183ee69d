//! Chat provider trait and implementations.

pub mod deepseek;
pub mod http;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::error::{PromptloopError, Result};
use crate::types::{ChatMessage, FinishReason, GenerationSettings, Usage};

/// Response from a provider.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub text: String,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by all chat providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name (e.g., "openai", "deepseek").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Send the conversation and return the model's reply.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        settings: &GenerationSettings,
    ) -> Result<ChatCompletion>;
}

// Shared providers delegate through the Arc.
#[async_trait]
impl<T: ChatProvider + ?Sized> ChatProvider for Arc<T> {
    fn provider_name(&self) -> &str {
        self.as_ref().provider_name()
    }

    fn model_id(&self) -> &str {
        self.as_ref().model_id()
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        settings: &GenerationSettings,
    ) -> Result<ChatCompletion> {
        self.as_ref().complete(messages, settings).await
    }
}

/// Create a provider for the configured model.
///
/// The provider is picked by a model-name heuristic: names containing "gpt"
/// or "openai" use the OpenAI client, names containing "deepseek" use the
/// DeepSeek wrapper, and anything else defaults to the OpenAI-format client
/// with a warning.
pub fn create_provider(config: &LlmConfig) -> Result<Box<dyn ChatProvider>> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        PromptloopError::Authentication(
            "API key is not set. Please check your environment variables.".to_string(),
        )
    })?;

    let model = config.model.to_lowercase();
    if model.contains("deepseek") {
        return Ok(Box::new(deepseek::DeepSeekProvider::new(config, api_key)));
    }

    if !model.contains("gpt") && !model.contains("openai") {
        tracing::warn!(
            model = %config.model,
            "unknown model type, defaulting to the OpenAI-format client"
        );
    }
    Ok(Box::new(openai::OpenAiProvider::new(config, api_key)))
}
