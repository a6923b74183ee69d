//! Shared test helpers and mock provider.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use promptloop::error::{PromptloopError, Result};
use promptloop::provider::{ChatCompletion, ChatProvider};
use promptloop::types::{ChatMessage, FinishReason, GenerationSettings, Usage};

/// A mock provider that returns canned replies in queue order and records
/// every request it receives.
pub struct MockProvider {
    model_id: String,
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a text reply.
    pub fn queue_reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    }

    /// Queue an error.
    pub fn queue_error(&self, error: PromptloopError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Messages of the nth request received.
    pub fn request(&self, n: usize) -> Vec<ChatMessage> {
        self.requests.lock().unwrap()[n].clone()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _settings: &GenerationSettings,
    ) -> Result<ChatCompletion> {
        self.requests.lock().unwrap().push(messages.to_vec());

        let next = self.replies.lock().unwrap().pop_front();
        let text = match next {
            Some(reply) => reply?,
            None => "Mock reply".to_string(),
        };
        Ok(ChatCompletion {
            text,
            usage: Usage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            },
            finish_reason: Some(FinishReason::Stop),
        })
    }
}

