//! Mapping between abstraction types and OpenAI wire types

use crate::llm::core::{
    error::LlmError,
    types::{
        ChatMessage, Completion, CompletionRequest, FinishReason, MessageRole, StreamEvent,
        UsageMetadata,
    },
};

use super::types::{OpenAiMessage, OpenAiRequest, OpenAiResponse, OpenAiStreamChunk, OpenAiUsage};

/// Convert our abstraction request to the chat completions body
pub fn to_openai_request(request: CompletionRequest, stream: bool) -> OpenAiRequest {
    OpenAiRequest {
        model: request.model,
        messages: request.messages.into_iter().map(to_openai_message).collect(),
        max_tokens: request.config.max_tokens,
        temperature: request.config.temperature,
        top_p: request.config.top_p,
        stop: request.config.stop,
        stream,
    }
}

fn to_openai_message(message: ChatMessage) -> OpenAiMessage {
    let role = match message.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    };

    OpenAiMessage {
        role: role.to_string(),
        content: message.content,
    }
}

fn to_usage(usage: OpenAiUsage) -> UsageMetadata {
    UsageMetadata::new(usage.prompt_tokens, usage.completion_tokens)
}

/// Convert a non-streaming response, taking the first choice
pub fn from_openai_response(response: OpenAiResponse) -> Result<Completion, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;

    let content = choice.message.content.ok_or(LlmError::EmptyResponse)?;

    Ok(Completion {
        content,
        finish_reason: choice
            .finish_reason
            .as_deref()
            .map(FinishReason::from_openai)
            .unwrap_or(FinishReason::Stop),
        usage: response.usage.map(to_usage),
    })
}

/// Convert one streamed chunk into zero or more abstraction events
pub fn from_openai_chunk(chunk: OpenAiStreamChunk) -> Vec<StreamEvent> {
    let usage = chunk.usage.map(to_usage);
    let mut events = Vec::new();

    for choice in chunk.choices {
        if let Some(text) = choice.delta.content.filter(|text| !text.is_empty()) {
            events.push(StreamEvent::TextDelta { text });
        }

        if let Some(reason) = choice.finish_reason {
            events.push(StreamEvent::MessageEnd {
                finish_reason: FinishReason::from_openai(&reason),
                usage,
            });
        }
    }

    events
}
