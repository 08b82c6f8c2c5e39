//! OpenAI-compatible provider (OpenAI, Groq, DeepSeek, Gemini)

pub mod client;
pub mod mapper;
pub mod sse;
pub mod types;

pub use client::OpenAiClient;
