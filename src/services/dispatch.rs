//! Routing chat replies to the provider that serves a model

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use futures::stream::Stream;
use futures::StreamExt;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::{self, ChatTurn, Database, ModelRoute};
use crate::llm::{
    create_provider, ChatMessage, CompletionRequest, LlmError, LlmProvider, Service, StreamEvent,
};
use crate::models::ChatRole;
use crate::services::prompts::SYSTEM_PROMPT;
use crate::services::title;

/// Stream of reply text chunks
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Model not found")]
    ModelNotFound(Uuid),

    #[error(transparent)]
    Database(#[from] db::Error),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// A service plus the provider-side model name to call on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTarget {
    pub service: Service,
    pub model: String,
}

impl ModelTarget {
    pub fn new(service: Service, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
        }
    }
}

/// Providers available to this process, one per configured service
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Service, Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a provider for every service that has an API key
    pub fn from_api_keys(keys: &HashMap<Service, String>) -> Self {
        let mut registry = Self::new();

        for service in Service::ALL {
            match create_provider(service, keys.get(&service).cloned()) {
                Ok(provider) => {
                    registry.providers.insert(service, Arc::from(provider));
                    info!(%service, "Registered LLM provider");
                }
                Err(e) => warn!(%service, error = %e, "LLM provider not available"),
            }
        }

        registry
    }

    pub fn with_provider(mut self, service: Service, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(service, provider);
        self
    }

    pub fn get(&self, service: Service) -> Result<Arc<dyn LlmProvider>, LlmError> {
        self.providers
            .get(&service)
            .cloned()
            .ok_or_else(|| LlmError::UnsupportedService(service.to_string()))
    }

    pub fn contains(&self, service: Service) -> bool {
        self.providers.contains_key(&service)
    }
}

/// Build the request sent for a chat: system prompt, then the history in order
pub fn build_chat_request(model: &str, turns: &[ChatTurn]) -> CompletionRequest {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    messages.extend(turns.iter().map(|turn| match turn.role {
        ChatRole::User => ChatMessage::user(turn.content.clone()),
        ChatRole::Assistant => ChatMessage::assistant(turn.content.clone()),
    }));

    CompletionRequest::new(model, messages)
}

/// Looks up which service serves a model and forwards chats to it
#[derive(Clone)]
pub struct ModelDispatcher {
    db: Database,
    registry: Arc<ProviderRegistry>,
    title_target: ModelTarget,
}

impl ModelDispatcher {
    pub fn new(db: Database, registry: Arc<ProviderRegistry>, title_target: ModelTarget) -> Self {
        Self {
            db,
            registry,
            title_target,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    async fn resolve(
        &self,
        model_id: Uuid,
    ) -> Result<(ModelRoute, Arc<dyn LlmProvider>), DispatchError> {
        let route = self
            .db
            .get_model_name_and_service(model_id)
            .await?
            .ok_or(DispatchError::ModelNotFound(model_id))?;

        let service: Service = route.service.parse()?;
        let provider = self.registry.get(service)?;

        debug!(%model_id, model = %route.model_name, %service, "Resolved model");
        Ok((route, provider))
    }

    /// Generate the assistant's reply to a chat with the given model
    pub async fn reply(&self, model_id: Uuid, turns: &[ChatTurn]) -> Result<String, DispatchError> {
        let (route, provider) = self.resolve(model_id).await?;
        let completion = provider
            .complete(build_chat_request(&route.model_name, turns))
            .await?;
        Ok(completion.content)
    }

    /// Same as [`reply`](Self::reply), but yields text chunks as they arrive
    pub async fn stream_reply(
        &self,
        model_id: Uuid,
        turns: &[ChatTurn],
    ) -> Result<TextStream, DispatchError> {
        let (route, provider) = self.resolve(model_id).await?;
        let events = provider
            .stream_complete(build_chat_request(&route.model_name, turns))
            .await?;

        let text = events.filter_map(|event| {
            futures::future::ready(match event {
                Ok(StreamEvent::TextDelta { text }) => Some(Ok(text)),
                Ok(StreamEvent::MessageEnd { .. }) => None,
                Err(e) => Some(Err(e)),
            })
        });

        Ok(Box::pin(text))
    }

    /// Title a new chat from its first message using the configured title model
    pub async fn generate_title(&self, initial_message: &str) -> Result<String, DispatchError> {
        let provider = self.registry.get(self.title_target.service)?;
        let title =
            title::generate_title(provider.as_ref(), &self.title_target.model, initial_message)
                .await?;
        Ok(title)
    }
}
