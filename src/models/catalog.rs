use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An LLM a conversation can be pointed at
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfo {
    pub model_id: Uuid,
    pub model_name: String,
}
