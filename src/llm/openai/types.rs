//! Wire types for OpenAI-compatible chat completions

use serde::{Deserialize, Serialize};

/// Body of `POST {base}/chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponse {
    #[serde(default)]
    pub choices: Vec<OpenAiChoice>,
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoice {
    pub message: OpenAiResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OpenAiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// One `data:` payload of a streamed completion
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiStreamChunk {
    #[serde(default)]
    pub choices: Vec<OpenAiStreamChoice>,
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiStreamChoice {
    #[serde(default)]
    pub delta: OpenAiDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiDelta {
    #[serde(default)]
    pub content: Option<String>,
}

// Gemini's compatibility layer wraps the error object in a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OpenAiErrorResponse {
    Single(OpenAiErrorBody),
    Multiple(Vec<OpenAiErrorBody>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiErrorBody {
    pub error: OpenAiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiErrorDetail {
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

impl OpenAiErrorResponse {
    pub fn message(&self) -> Option<&str> {
        match self {
            OpenAiErrorResponse::Single(body) => Some(body.error.message.as_str()),
            OpenAiErrorResponse::Multiple(bodies) => {
                bodies.first().map(|body| body.error.message.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_skips_unset_parameters() {
        let request = OpenAiRequest {
            model: "gpt-4o".to_string(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: "Hi".to_string(),
            }],
            max_tokens: None,
            temperature: Some(0.2),
            top_p: None,
            stop: None,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(json["stream"], false);
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("stop").is_none());
    }

    #[test]
    fn test_stream_chunk_with_empty_delta() {
        let chunk: OpenAiStreamChunk = serde_json::from_str(
            r#"{"id":"c1","choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert!(chunk.choices[0].delta.content.is_none());
        assert_eq!(chunk.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_error_response_shapes() {
        let single: OpenAiErrorResponse =
            serde_json::from_str(r#"{"error":{"message":"bad key","type":"invalid_request_error"}}"#)
                .unwrap();
        assert_eq!(single.message(), Some("bad key"));

        let multiple: OpenAiErrorResponse =
            serde_json::from_str(r#"[{"error":{"message":"quota","code":429}}]"#).unwrap();
        assert_eq!(multiple.message(), Some("quota"));
    }
}
