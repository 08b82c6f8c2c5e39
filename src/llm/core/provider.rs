//! Provider trait for LLM implementations

use async_trait::async_trait;
use futures::stream::Stream;
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;

use super::{
    error::LlmError,
    types::{Completion, CompletionRequest, StreamEvent},
};
use crate::llm::openai::OpenAiClient;

/// Stream of incremental events from a provider
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>>;

/// Main interface that all LLM provider implementations must satisfy
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a complete reply in one response
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError>;

    /// Stream a reply as it is generated
    ///
    /// # Returns
    /// A pinned boxed stream of `StreamEvent` results, or an error if the request fails
    async fn stream_complete(&self, request: CompletionRequest) -> Result<EventStream, LlmError>;
}

/// A hosted LLM service with an OpenAI-compatible chat completions API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    OpenAi,
    Groq,
    DeepSeek,
    Gemini,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::OpenAi,
        Service::Groq,
        Service::DeepSeek,
        Service::Gemini,
    ];

    /// The name stored in the `models.service` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::OpenAi => "openai",
            Service::Groq => "groq",
            Service::DeepSeek => "deepseek",
            Service::Gemini => "gemini",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Service::OpenAi => "https://api.openai.com/v1",
            Service::Groq => "https://api.groq.com/openai/v1",
            Service::DeepSeek => "https://api.deepseek.com",
            Service::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Service::OpenAi => "OPENAI_API_KEY",
            Service::Groq => "GROQ_API_KEY",
            Service::DeepSeek => "DEEPSEEK_API_KEY",
            Service::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|service| service.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LlmError::UnsupportedService(s.to_string()))
    }
}

/// Create an LLM provider for a service
///
/// # Example
///
/// ```rust,no_run
/// use labmise::llm::{create_provider, Service};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = create_provider(Service::Groq, Some("gsk-...".to_string()))?;
/// # Ok(())
/// # }
/// ```
pub fn create_provider(
    service: Service,
    api_key: Option<String>,
) -> Result<Box<dyn LlmProvider>, LlmError> {
    let api_key = api_key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| LlmError::MissingApiKey(service.api_key_env().to_string()))?;

    Ok(Box::new(OpenAiClient::new(service, api_key)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_from_str() {
        assert_eq!("groq".parse::<Service>().unwrap(), Service::Groq);
        assert_eq!("OpenAI".parse::<Service>().unwrap(), Service::OpenAi);
        assert!(matches!(
            "mistral".parse::<Service>(),
            Err(LlmError::UnsupportedService(name)) if name == "mistral"
        ));
    }

    #[test]
    fn test_service_endpoints() {
        assert_eq!(Service::DeepSeek.base_url(), "https://api.deepseek.com");
        assert_eq!(Service::Gemini.api_key_env(), "GEMINI_API_KEY");
        for service in Service::ALL {
            assert!(service.base_url().starts_with("https://"));
            assert_eq!(service.to_string(), service.as_str());
        }
    }

    #[test]
    fn test_create_provider_requires_key() {
        assert!(matches!(
            create_provider(Service::Groq, None),
            Err(LlmError::MissingApiKey(var)) if var == "GROQ_API_KEY"
        ));
        assert!(create_provider(Service::Groq, Some(String::new())).is_err());
        assert!(create_provider(Service::Groq, Some("key".to_string())).is_ok());
    }
}
