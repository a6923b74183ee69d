//! DeepSeek provider (OpenAI-format API).

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::error::Result;
use crate::types::{ChatMessage, GenerationSettings};

use super::openai::OpenAiProvider;
use super::{ChatCompletion, ChatProvider};

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";

pub struct DeepSeekProvider {
    inner: OpenAiProvider,
}

impl DeepSeekProvider {
    pub fn new(config: &LlmConfig, api_key: String) -> Self {
        let mut inner = OpenAiProvider::new(config, api_key);
        if config.api_base.is_none() {
            inner = inner.with_base_url(DEFAULT_BASE_URL.to_string());
        }
        Self { inner }
    }
}

#[async_trait]
impl ChatProvider for DeepSeekProvider {
    fn provider_name(&self) -> &str {
        "deepseek"
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        settings: &GenerationSettings,
    ) -> Result<ChatCompletion> {
        self.inner.complete(messages, settings).await
    }
}
