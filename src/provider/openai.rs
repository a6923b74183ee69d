//! OpenAI Chat Completions API client.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::{PromptloopError, Result};
use crate::types::{ChatMessage, FinishReason, GenerationSettings, Usage};

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{ChatCompletion, ChatProvider};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    model: String,
    api_key: String,
    organization: Option<String>,
    base_url: String,
    timeout: Option<Duration>,
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig, api_key: String) -> Self {
        Self {
            model: config.model.clone(),
            api_key,
            organization: config.organization.clone(),
            base_url: config
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: config.timeout.map(Duration::from_secs),
        }
    }

    /// Override the base URL (used by wrapper providers).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn build_request_body(
        &self,
        messages: &[ChatMessage],
        settings: &GenerationSettings,
    ) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| serde_json::json!({ "role": m.role, "content": m.content }))
            .collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        let obj = body.as_object_mut().expect("body is an object");
        if let Some(temp) = settings.temperature {
            obj.insert("temperature".into(), temp.into());
        }
        if let Some(max) = settings.max_tokens {
            obj.insert("max_tokens".into(), max.into());
        }
        if let Some(top_p) = settings.top_p {
            obj.insert("top_p".into(), top_p.into());
        }
        if let Some(fp) = settings.frequency_penalty {
            obj.insert("frequency_penalty".into(), fp.into());
        }
        if let Some(pp) = settings.presence_penalty {
            obj.insert("presence_penalty".into(), pp.into());
        }
        if let Some(ref stops) = settings.stop_sequences {
            obj.insert("stop".into(), serde_json::json!(stops));
        }

        body
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        settings: &GenerationSettings,
    ) -> Result<ChatCompletion> {
        let body = self.build_request_body(messages, settings);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        debug!(model = %self.model, messages = messages.len(), "chat completion request");

        let mut request = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key, self.organization.as_deref()))
            .json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send().await?;
        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: ChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PromptloopError::api(200, "No choices in chat completion response"))?;

        Ok(ChatCompletion {
            text: choice.message.content.unwrap_or_default(),
            usage: data
                .usage
                .map(|u| Usage {
                    prompt_tokens: u.prompt_tokens,
                    completion_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                })
                .unwrap_or_default(),
            finish_reason: choice
                .finish_reason
                .as_deref()
                .and_then(|s| FinishReason::from_str(s).ok()),
        })
    }
}

// Wire types (internal)

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
