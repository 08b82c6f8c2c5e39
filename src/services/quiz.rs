//! Multi-stage quiz generation
//!
//! A quiz is produced by a fixed sequence of model calls that share a
//! key/value state:
//! - the researcher writes `research_results`
//! - the question generator writes `quiz_questions`
//! - the distractor generator writes `quiz_with_distractors`
//! - the formatter writes `final_quiz`
//!
//! The whole sequence runs `max_iterations` times so later passes can refine
//! earlier output. The pipeline reports its progress as a stream of events.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use async_stream::stream;
use futures::stream::Stream;
use futures::StreamExt;
use pin_utils::pin_mut;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::llm::{ChatMessage, CompletionRequest, GenerationConfig, LlmError, LlmProvider};
use crate::services::prompts::{
    DISTRACTOR_GENERATOR_INSTRUCTIONS, FORMATTER_INSTRUCTIONS, QUESTION_GENERATOR_INSTRUCTIONS,
    RESEARCHER_INSTRUCTIONS,
};

pub const USER_REQUEST_KEY: &str = "user_request";
pub const FINAL_QUIZ_KEY: &str = "final_quiz";
pub const DEFAULT_MAX_ITERATIONS: usize = 2;

/// Errors that can occur while generating a quiz
#[derive(Debug, Error)]
pub enum QuizError {
    /// Error from the LLM provider
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The pipeline finished without producing the final quiz
    #[error("Quiz pipeline produced no `{0}` output")]
    MissingOutput(String),
}

/// One model call of the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizStage {
    pub name: &'static str,
    pub instruction: &'static str,
    /// State key the stage's reply is stored under
    pub output_key: &'static str,
}

pub fn default_stages() -> Vec<QuizStage> {
    vec![
        QuizStage {
            name: "QuizResearcher",
            instruction: RESEARCHER_INSTRUCTIONS,
            output_key: "research_results",
        },
        QuizStage {
            name: "QuestionGenerator",
            instruction: QUESTION_GENERATOR_INSTRUCTIONS,
            output_key: "quiz_questions",
        },
        QuizStage {
            name: "DistractorGenerator",
            instruction: DISTRACTOR_GENERATOR_INSTRUCTIONS,
            output_key: "quiz_with_distractors",
        },
        QuizStage {
            name: "QuizFormatter",
            instruction: FORMATTER_INSTRUCTIONS,
            output_key: FINAL_QUIZ_KEY,
        },
    ]
}

/// Events emitted by the pipeline during execution
#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    IterationStarted { iteration: usize },
    StageStarted { iteration: usize, stage: &'static str },
    StageCompleted {
        iteration: usize,
        stage: &'static str,
        output_key: &'static str,
        output_chars: usize,
    },
    Completed,
}

pub struct QuizPipeline {
    provider: Arc<dyn LlmProvider>,
    model: String,
    stages: Vec<QuizStage>,
    config: GenerationConfig,
    /// Shared state: the user request plus every stage output
    state: HashMap<String, String>,
    max_iterations: usize,
}

impl QuizPipeline {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            stages: default_stages(),
            config: GenerationConfig::default(),
            state: HashMap::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_stages(mut self, stages: Vec<QuizStage>) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> &HashMap<String, String> {
        &self.state
    }

    /// Run every stage `max_iterations` times for `user_request`
    ///
    /// The returned stream ends after `Completed` or the first error.
    pub fn run(
        &mut self,
        user_request: impl Into<String>,
    ) -> Pin<Box<dyn Stream<Item = Result<QuizEvent, QuizError>> + Send + '_>> {
        self.state.clear();
        self.state
            .insert(USER_REQUEST_KEY.to_string(), user_request.into());

        Box::pin(self.create_stream())
    }

    fn create_stream(&mut self) -> impl Stream<Item = Result<QuizEvent, QuizError>> + '_ {
        stream! {
            for iteration in 1..=self.max_iterations {
                yield Ok(QuizEvent::IterationStarted { iteration });

                for index in 0..self.stages.len() {
                    let stage = self.stages[index].clone();
                    yield Ok(QuizEvent::StageStarted { iteration, stage: stage.name });

                    let request = self.stage_request(&stage);
                    let output = match self.provider.complete(request).await {
                        Ok(completion) => completion.content,
                        Err(e) => {
                            yield Err(QuizError::Llm(e));
                            return;
                        }
                    };

                    let output_chars = output.chars().count();
                    self.state.insert(stage.output_key.to_string(), output);

                    yield Ok(QuizEvent::StageCompleted {
                        iteration,
                        stage: stage.name,
                        output_key: stage.output_key,
                        output_chars,
                    });
                }
            }

            yield Ok(QuizEvent::Completed);
        }
    }

    fn stage_request(&self, stage: &QuizStage) -> CompletionRequest {
        CompletionRequest::new(
            self.model.clone(),
            vec![
                ChatMessage::system(stage.instruction),
                ChatMessage::user(self.render_state()),
            ],
        )
        .with_config(self.config.clone())
    }

    /// The state as markdown sections, request first, then outputs in stage order
    fn render_state(&self) -> String {
        let keys = std::iter::once(USER_REQUEST_KEY)
            .chain(self.stages.iter().map(|s| s.output_key));

        let mut sections = Vec::new();
        for key in keys {
            if let Some(value) = self.state.get(key) {
                sections.push(format!("## {}\n{}", key, value));
            }
        }
        sections.join("\n\n")
    }

    /// The final quiz, once the pipeline has run
    pub fn final_quiz(&self) -> Result<Value, QuizError> {
        self.state
            .get(FINAL_QUIZ_KEY)
            .map(|raw| extract_final_quiz(raw))
            .ok_or_else(|| QuizError::MissingOutput(FINAL_QUIZ_KEY.to_string()))
    }

    /// Run the pipeline to completion and return the final quiz
    pub async fn generate(mut self, user_request: impl Into<String>) -> Result<Value, QuizError> {
        {
            let events = self.run(user_request);
            pin_mut!(events);

            while let Some(event) = events.next().await {
                let event = event?;
                debug!(?event, "Quiz pipeline progress");
            }
        }

        self.final_quiz()
    }
}

/// Pull the quiz out of the formatter's reply
///
/// A JSON object (bare or in a ```json fence) with a `final_quiz` field yields
/// that field. Anything else is returned as text.
pub fn extract_final_quiz(raw: &str) -> Value {
    let trimmed = raw.trim();

    let json_text = match trimmed.strip_prefix("```json") {
        Some(rest) => rest.trim_end().strip_suffix("```").unwrap_or(rest).trim(),
        None => trimmed,
    };

    if json_text.starts_with('{') {
        if let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(json_text) {
            if let Some(quiz) = object.remove(FINAL_QUIZ_KEY) {
                return quiz;
            }
        }
    }

    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Completion, EventStream, FinishReason};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    // Replies "<stage>#<call>" and records every request
    struct EchoProvider {
        calls: Mutex<Vec<CompletionRequest>>,
        fail_on_call: Option<usize>,
        final_reply: String,
    }

    impl EchoProvider {
        fn new(final_reply: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on_call: None,
                final_reply: final_reply.to_string(),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
            let mut calls = self.calls.lock().unwrap();
            let call = calls.len();
            let is_formatter = request.messages[0].content == FORMATTER_INSTRUCTIONS;
            calls.push(request);

            if self.fail_on_call == Some(call) {
                return Err(LlmError::HttpError {
                    status: 500,
                    body: "boom".to_string(),
                });
            }

            let content = if is_formatter {
                self.final_reply.clone()
            } else {
                format!("output#{}", call)
            };
            Ok(Completion {
                content,
                finish_reason: FinishReason::Stop,
                usage: None,
            })
        }

        async fn stream_complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<EventStream, LlmError> {
            Err(LlmError::InvalidRequest("not streamed".to_string()))
        }
    }

    #[test]
    fn test_default_stages_order() {
        let keys: Vec<_> = default_stages().iter().map(|s| s.output_key).collect();
        assert_eq!(
            keys,
            vec![
                "research_results",
                "quiz_questions",
                "quiz_with_distractors",
                "final_quiz"
            ]
        );
    }

    #[test]
    fn test_extract_final_quiz_from_fenced_json() {
        let raw = "```json\n{\"final_quiz\": {\"title\": \"Rust\"}}\n```";
        assert_eq!(extract_final_quiz(raw), json!({"title": "Rust"}));
    }

    #[test]
    fn test_extract_final_quiz_from_bare_json() {
        assert_eq!(
            extract_final_quiz("{\"final_quiz\": \"1. What is ownership?\"}"),
            json!("1. What is ownership?")
        );
    }

    #[test]
    fn test_extract_final_quiz_falls_back_to_text() {
        assert_eq!(extract_final_quiz("Just text"), json!("Just text"));
        assert_eq!(
            extract_final_quiz("{\"title\": \"no quiz key\"}"),
            json!("{\"title\": \"no quiz key\"}")
        );
        assert_eq!(extract_final_quiz("{broken"), json!("{broken"));
    }

    #[tokio::test]
    async fn test_pipeline_runs_every_stage_each_iteration() {
        let provider = Arc::new(EchoProvider::new("{\"final_quiz\": {\"questions\": []}}"));
        let mut pipeline = QuizPipeline::new(provider.clone(), "gemini-2.0-flash");

        let events: Vec<_> = pipeline.run("Rust ownership").collect().await;
        let events: Vec<QuizEvent> = events.into_iter().map(|e| e.unwrap()).collect();

        // 2 iterations x (1 start + 4 x (started + completed)) + completed
        assert_eq!(events.len(), 2 * (1 + 4 * 2) + 1);
        assert_eq!(events[0], QuizEvent::IterationStarted { iteration: 1 });
        assert_eq!(events.last(), Some(&QuizEvent::Completed));

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 8);
        assert!(calls.iter().all(|c| c.model == "gemini-2.0-flash"));

        // The first stage only sees the request; the second sees the research too
        assert_eq!(calls[0].messages[1].content, "## user_request\nRust ownership");
        assert!(calls[1].messages[1].content.contains("## research_results\noutput#0"));
        drop(calls);

        assert_eq!(pipeline.final_quiz().unwrap(), json!({"questions": []}));
    }

    #[tokio::test]
    async fn test_pipeline_stops_on_error() {
        let mut provider = EchoProvider::new("done");
        provider.fail_on_call = Some(1);
        let provider = Arc::new(provider);

        let mut pipeline = QuizPipeline::new(provider.clone(), "model").with_max_iterations(1);
        let events: Vec<_> = pipeline.run("topic").collect().await;

        assert!(matches!(events.last(), Some(Err(QuizError::Llm(_)))));
        assert_eq!(provider.calls.lock().unwrap().len(), 2);
        assert!(matches!(
            pipeline.final_quiz(),
            Err(QuizError::MissingOutput(key)) if key == "final_quiz"
        ));
    }

    #[tokio::test]
    async fn test_generate_returns_text_quiz() {
        let provider = Arc::new(EchoProvider::new("Q1: What is a borrow?"));
        let quiz = QuizPipeline::new(provider, "model")
            .with_max_iterations(1)
            .generate("borrowing")
            .await
            .unwrap();

        assert_eq!(quiz, json!("Q1: What is a borrow?"));
    }
}
