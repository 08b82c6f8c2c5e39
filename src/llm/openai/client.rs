//! OpenAI-compatible chat completions client
//!
//! One client covers every service in [`Service`]: they all expose
//! `POST {base}/chat/completions` with bearer authentication.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header::RETRY_AFTER, Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider, Service},
    types::{Completion, CompletionRequest},
};

use super::mapper::{from_openai_chunk, from_openai_response, to_openai_request};
use super::sse::{parse_sse_stream, SseFrame};
use super::types::{OpenAiErrorResponse, OpenAiRequest, OpenAiResponse};

/// Maximum number of attempts for transient errors
const MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff
const BASE_DELAY: Duration = Duration::from_millis(500);

/// Client for one OpenAI-compatible service
pub struct OpenAiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Service name, used in logs
    service: String,
    /// Base URL without trailing slash
    base_url: String,
    api_key: String,
    max_attempts: u32,
    base_delay: Duration,
}

impl OpenAiClient {
    /// Create a client for one of the known services
    pub fn new(service: Service, api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_base_url(service.as_str(), service.base_url(), api_key)
    }

    /// Create a client against an arbitrary OpenAI-compatible endpoint
    pub fn with_base_url(
        service: &str,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| LlmError::HttpError {
                status: 0,
                body: format!("Failed to create HTTP client: {}", e),
            })?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(service, %base_url, "Initialized LLM client");

        Ok(Self {
            http_client,
            service: service.to_string(),
            base_url,
            api_key: api_key.into(),
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
        })
    }

    /// Override the retry policy
    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.base_delay = base_delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn is_retryable_status(status: StatusCode) -> bool {
        matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
    }

    /// Send the request, retrying network failures and transient statuses
    ///
    /// Returns the first successful response; its body is left unread.
    async fn send_with_retry(&self, body: &OpenAiRequest) -> Result<Response, LlmError> {
        let url = self.endpoint();
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                warn!(
                    service = %self.service,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying LLM request"
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .http_client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        service = %self.service,
                        attempt,
                        error = %e,
                        "Network error calling LLM API"
                    );
                    last_error = Some(e.into());
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs);
            let text = response.text().await.unwrap_or_default();
            let error = error_from_status(status, retry_after, &text);

            if !Self::is_retryable_status(status) {
                return Err(error);
            }

            warn!(service = %self.service, attempt, %status, "Transient LLM API error");
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| LlmError::HttpError {
            status: 0,
            body: format!("LLM request failed after {} attempts", self.max_attempts),
        }))
    }
}

/// Build an error from a failed response, preferring the provider's message
fn error_from_status(status: StatusCode, retry_after: Option<Duration>, body: &str) -> LlmError {
    let message = serde_json::from_str::<OpenAiErrorResponse>(body)
        .ok()
        .and_then(|parsed| parsed.message().map(str::to_string))
        .unwrap_or_else(|| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthenticationError(message),
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded { retry_after },
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            LlmError::InvalidRequest(message)
        }
        _ => LlmError::HttpError {
            status: status.as_u16(),
            body: message,
        },
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        debug!(
            service = %self.service,
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let body = to_openai_request(request, false);
        let response = self.send_with_retry(&body).await?;
        let text = response.text().await?;
        let parsed: OpenAiResponse = serde_json::from_str(&text)?;

        let completion = from_openai_response(parsed)?;
        debug!(
            service = %self.service,
            finish_reason = ?completion.finish_reason,
            tokens = completion.usage.map(|u| u.total_tokens).unwrap_or(0),
            "Received chat completion"
        );
        Ok(completion)
    }

    async fn stream_complete(&self, request: CompletionRequest) -> Result<EventStream, LlmError> {
        debug!(
            service = %self.service,
            model = %request.model,
            messages = request.messages.len(),
            "Sending streaming chat completion request"
        );

        let body = to_openai_request(request, true);
        let response = self.send_with_retry(&body).await?;

        let frames = parse_sse_stream(Box::pin(response.bytes_stream()));

        let event_stream = frames
            .take_while(|frame| futures::future::ready(!matches!(frame, Ok(SseFrame::Done))))
            .flat_map(|frame| match frame {
                Ok(SseFrame::Chunk(chunk)) => futures::stream::iter(
                    from_openai_chunk(chunk).into_iter().map(Ok).collect::<Vec<_>>(),
                ),
                Ok(SseFrame::Done) => futures::stream::iter(Vec::new()),
                Err(e) => futures::stream::iter(vec![Err(e)]),
            });

        Ok(Box::pin(event_stream))
    }
}
