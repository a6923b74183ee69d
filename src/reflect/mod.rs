//! Reflection: a second LLM pass that critiques and improves an answer.

use tracing::{debug, error, info};

use crate::provider::ChatProvider;
use crate::types::{ChatMessage, Conversation, GenerationSettings};

const REFLECTION_SYSTEM_PROMPT: &str = "You are a high-quality response analyzer. \
Your task is to evaluate and improve given responses.";

/// Indicator prefixes that mark the start of an improved answer in the
/// critique text.
const IMPROVED_INDICATORS: &[&str] = &[
    "Improved Response:",
    "Improved Version:",
    "Here is the improved response:",
    "Optimized Answer:",
];

/// Phrases meaning the critique found nothing to improve.
const ALREADY_GOOD: &[&str] = &["Current response is already good", "No improvement needed"];

/// Critiques an answer and extracts an improved version when the model
/// offers one. Provider errors never fail the run; the original answer is
/// kept.
#[derive(Debug, Clone, Default)]
pub struct Reflector {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Overrides the default analyzer system prompt.
    pub system_prompt: Option<String>,
    pub disabled: bool,
}

impl Reflector {
    pub fn new() -> Self {
        Self {
            temperature: Some(0.7),
            max_tokens: None,
            system_prompt: None,
            disabled: false,
        }
    }

    /// Reflect on `answer` for `query`. Returns the improved answer, or the
    /// original when reflection is disabled, fails, or finds nothing to
    /// improve.
    pub async fn reflect(
        &self,
        provider: &dyn ChatProvider,
        query: &str,
        answer: &str,
    ) -> String {
        if self.disabled {
            debug!("reflector is disabled, skipping");
            return answer.to_string();
        }
        if answer.trim().is_empty() {
            debug!("answer is empty, skipping reflection");
            return answer.to_string();
        }

        let system = self
            .system_prompt
            .as_deref()
            .unwrap_or(REFLECTION_SYSTEM_PROMPT);
        let messages = vec![
            ChatMessage::system(system),
            ChatMessage::user(build_reflection_prompt(query, answer)),
        ];
        let settings = GenerationSettings {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..Default::default()
        };

        let critique = match provider.complete(&messages, &settings).await {
            Ok(completion) => completion.text,
            Err(e) => {
                error!(error = %e, "reflection call failed, keeping original answer");
                return answer.to_string();
            }
        };

        if ALREADY_GOOD.iter().any(|phrase| critique.contains(phrase)) {
            debug!("critique found nothing to improve");
            return answer.to_string();
        }

        match extract_improved_response(&critique) {
            Some(improved) if improved != answer => {
                info!("reflection produced an improved answer");
                improved
            }
            _ => {
                debug!("reflection produced no significant improvement");
                answer.to_string()
            }
        }
    }

    /// Apply reflection to a conversation: critique the most recent
    /// user/assistant exchange and rewrite the assistant turn when the
    /// critique improved it.
    pub async fn apply(&self, provider: &dyn ChatProvider, conversation: &mut Conversation) {
        let Some((query, answer)) = conversation.last_exchange() else {
            return;
        };
        let (query, answer) = (query.to_string(), answer.to_string());
        let improved = self.reflect(provider, &query, &answer).await;
        if improved != answer {
            conversation.amend_last_assistant(improved);
        }
    }
}

fn build_reflection_prompt(query: &str, answer: &str) -> String {
    format!(
        "Please evaluate the quality of the following response, which is an answer \
to a user query. After evaluation, provide an improved version if necessary:\n\n\
User Query: {query}\n\n\
Current Response:\n{answer}\n\n\
Please evaluate the response based on the following aspects:\n\
1. Accuracy: Is the information accurate?\n\
2. Relevance: Does the response fully answer the user's query?\n\
3. Completeness: Does it cover all important aspects?\n\
4. Clarity: Is the expression clear and understandable?\n\
5. Logicality: Are the arguments logical?\n\
6. Format: Is the format appropriate and easy to read?\n\n\
If there are obvious issues with the current response, please provide an improved \
response prefixed with \"Improved Response:\". If the current response is already \
good, please state \"Current response is already good\" and return the original \
response.\n\nEvaluation:\n"
    )
}

/// Extract the improved answer from the critique, if one was offered.
fn extract_improved_response(critique: &str) -> Option<String> {
    for indicator in IMPROVED_INDICATORS {
        if let Some(idx) = critique.find(indicator) {
            let improved = critique[idx + indicator.len()..].trim();
            if !improved.is_empty() {
                return Some(improved.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improved_response_is_extracted() {
        let critique = "The answer lacks detail.\n\nImproved Response: A fuller answer.";
        assert_eq!(
            extract_improved_response(critique).as_deref(),
            Some("A fuller answer.")
        );
    }

    #[test]
    fn all_indicators_are_recognized() {
        for indicator in IMPROVED_INDICATORS {
            let critique = format!("Evaluation done.\n{indicator} better text");
            assert_eq!(
                extract_improved_response(&critique).as_deref(),
                Some("better text"),
                "indicator: {indicator}"
            );
        }
    }

    #[test]
    fn already_good_returns_none() {
        assert_eq!(
            extract_improved_response("Current response is already good."),
            None
        );
    }

    #[test]
    fn critique_without_indicator_returns_none() {
        assert_eq!(extract_improved_response("Looks fine to me."), None);
    }
}
