//! Model-facing services: reply dispatch, chat titles and quiz generation

pub mod dispatch;
pub mod prompts;
pub mod quiz;
pub mod title;

pub use dispatch::{DispatchError, ModelDispatcher, ModelTarget, ProviderRegistry, TextStream};
pub use quiz::{QuizError, QuizEvent, QuizPipeline};
