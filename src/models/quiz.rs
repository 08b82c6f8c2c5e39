use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct QuizRequest {
    pub topic: String,
}

impl QuizRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.topic.trim().is_empty() {
            return Err("Quiz topic must not be empty".to_string());
        }
        Ok(())
    }
}

/// The finished quiz: plain text, or structured JSON when the formatter produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResponse {
    pub quiz: serde_json::Value,
}
