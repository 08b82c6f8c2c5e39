//! OpenAI-compatible client against a mock HTTP server

use std::time::Duration;

use futures::StreamExt;
use labmise::llm::{
    ChatMessage, CompletionRequest, FinishReason, LlmError, LlmProvider, OpenAiClient, StreamEvent,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::with_base_url("mock", server.uri(), "test-key")
        .unwrap()
        .with_retry(3, Duration::from_millis(10))
}

fn request() -> CompletionRequest {
    CompletionRequest::new(
        "gpt-4o-mini",
        vec![
            ChatMessage::system("Be brief."),
            ChatMessage::user("What is 2+2?"),
        ],
    )
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13}
    })
}

#[tokio::test]
async fn test_complete_sends_messages_and_parses_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "stream": false,
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "What is 2+2?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("4")))
        .expect(1)
        .mount(&server)
        .await;

    let completion = client(&server).complete(request()).await.unwrap();

    assert_eq!(completion.content, "4");
    assert_eq!(completion.finish_reason, FinishReason::Stop);
    assert_eq!(completion.usage.unwrap().total_tokens, 13);
}

#[tokio::test]
async fn test_retries_transient_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("finally")))
        .expect(1)
        .mount(&server)
        .await;

    let completion = client(&server).complete(request()).await.unwrap();
    assert_eq!(completion.content, "finally");
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_json(json!({"error": {"message": "slow down"}})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let result = client(&server).complete(request()).await;
    assert!(matches!(
        result,
        Err(LlmError::RateLimitExceeded { retry_after: Some(d) }) if d == Duration::from_secs(7)
    ));
}

#[tokio::test]
async fn test_authentication_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Invalid API key", "type": "auth"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server).complete(request()).await;
    assert!(matches!(result, Err(LlmError::AuthenticationError(msg)) if msg == "Invalid API key"));
}

#[tokio::test]
async fn test_gemini_style_error_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!([{"error": {"message": "model not found"}}])),
        )
        .mount(&server)
        .await;

    let result = client(&server).complete(request()).await;
    assert!(matches!(result, Err(LlmError::InvalidRequest(msg)) if msg == "model not found"));
}

#[tokio::test]
async fn test_stream_complete_yields_deltas() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"}}]}\n\n",
        ": keep-alive\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\", world\"}}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let stream = client(&server).stream_complete(request()).await.unwrap();
    let events: Vec<StreamEvent> = stream.map(|event| event.unwrap()).collect().await;

    let text: String = events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::TextDelta { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Hello, world");
    assert!(matches!(
        events.last(),
        Some(StreamEvent::MessageEnd { finish_reason: FinishReason::Stop, .. })
    ));
}
