//! HTTP provider tests against a wiremock server.

use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use promptloop::config::LlmConfig;
use promptloop::error::{ErrorCategory, PromptloopError};
use promptloop::provider::openai::OpenAiProvider;
use promptloop::provider::{create_provider, ChatProvider};
use promptloop::types::{ChatMessage, FinishReason, GenerationSettings};

fn config_for(server: &MockServer) -> LlmConfig {
    LlmConfig {
        model: "gpt-4o".to_string(),
        api_key: Some("test-key".to_string()),
        api_base: Some(server.uri()),
        ..Default::default()
    }
}

fn completion_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20 }
    })
}

#[tokio::test]
async fn completion_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello!")))
        .mount(&server)
        .await;

    let provider = create_provider(&config_for(&server)).unwrap();
    let messages = vec![ChatMessage::user("hi")];
    let completion = provider
        .complete(&messages, &GenerationSettings::default())
        .await
        .unwrap();

    assert_eq!(completion.text, "Hello!");
    assert_eq!(completion.usage.prompt_tokens, 12);
    assert_eq!(completion.usage.completion_tokens, 8);
    assert_eq!(completion.usage.total_tokens, 20);
    assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
}

#[tokio::test]
async fn request_carries_auth_model_and_settings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "temperature": 0.2,
            "max_tokens": 256,
            "messages": [
                { "role": "system", "content": "be brief" },
                { "role": "user", "content": "hi" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = create_provider(&config_for(&server)).unwrap();
    let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
    let settings = GenerationSettings::builder()
        .temperature(0.2)
        .max_tokens(256)
        .build();
    provider.complete(&messages, &settings).await.unwrap();
}

#[tokio::test]
async fn organization_header_is_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("openai-organization", "org-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let config = LlmConfig {
        organization: Some("org-42".to_string()),
        ..config_for(&server)
    };
    let provider = create_provider(&config).unwrap();
    provider
        .complete(&[ChatMessage::user("hi")], &GenerationSettings::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let provider = create_provider(&config_for(&server)).unwrap();
    let err = provider
        .complete(&[ChatMessage::user("hi")], &GenerationSettings::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PromptloopError::Authentication(_)));
    assert_eq!(err.category(), ErrorCategory::Authentication);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_string(r#"{"error": {"message": "slow down", "retry_after": 2}}"#),
        )
        .mount(&server)
        .await;

    let provider = create_provider(&config_for(&server)).unwrap();
    let err = provider
        .complete(&[ChatMessage::user("hi")], &GenerationSettings::default())
        .await
        .unwrap_err();

    match err {
        PromptloopError::RateLimited { retry_after_ms } => {
            assert_eq!(retry_after_ms, Some(2000));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let provider = create_provider(&config_for(&server)).unwrap();
    let err = provider
        .complete(&[ChatMessage::user("hi")], &GenerationSettings::default())
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Server);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn empty_choices_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [],
            "usage": null
        })))
        .mount(&server)
        .await;

    let provider = create_provider(&config_for(&server)).unwrap();
    let err = provider
        .complete(&[ChatMessage::user("hi")], &GenerationSettings::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PromptloopError::Api { .. }));
}

#[tokio::test]
async fn deepseek_provider_defaults_its_base_url_only_without_override() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "model": "deepseek-chat" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let config = LlmConfig {
        model: "deepseek-chat".to_string(),
        ..config_for(&server)
    };
    let provider = create_provider(&config).unwrap();
    assert_eq!(provider.provider_name(), "deepseek");

    // The explicit api_base wins over the DeepSeek default.
    provider
        .complete(&[ChatMessage::user("hi")], &GenerationSettings::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn base_url_trailing_slash_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let config = LlmConfig {
        api_base: Some(format!("{}/v1/", server.uri())),
        ..config_for(&server)
    };
    let provider = OpenAiProvider::new(&config, "test-key".to_string());
    provider
        .complete(&[ChatMessage::user("hi")], &GenerationSettings::default())
        .await
        .unwrap();
}
