//! LLM Abstraction Layer
//!
//! A provider-neutral interface for chat completions, implemented once for
//! every hosted service that speaks the OpenAI chat completions protocol.

pub mod core;
pub mod openai;

// Re-export commonly used types
pub use core::{
    config::GenerationConfig,
    error::LlmError,
    provider::{create_provider, EventStream, LlmProvider, Service},
    types::{
        ChatMessage, Completion, CompletionRequest, FinishReason, MessageRole, StreamEvent,
        UsageMetadata,
    },
};
pub use openai::OpenAiClient;
