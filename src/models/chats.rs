// Conversation and message schemas

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Longest title a user may set on a conversation
pub const MAX_TITLE_CHARS: usize = 200;

// Message Roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            other => Err(format!("unknown message role '{}'", other)),
        }
    }
}

// Stored Message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageRecord {
    pub message_id: i64,
    pub conversation_id: Uuid,
    pub role: ChatRole,
    pub model_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A conversation together with its messages in chronological order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatWithMessages {
    pub conversation_id: Uuid,
    pub current_model_id: Uuid,
    pub title: String,
    pub workspace_id: Option<Uuid>,
    pub folder_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<MessageRecord>,
}

// Request Types
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChatRequest {
    pub model_id: Uuid,
    pub initial_message: String,
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

impl CreateChatRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_message.trim().is_empty() {
            return Err("Initial message must not be empty".to_string());
        }
        if self.workspace_id.is_some() && self.folder_id.is_some() {
            return Err("A chat can be placed in a workspace or a folder, not both".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessageRequest {
    pub conversation_id: Uuid,
    pub content: String,
    /// Switches the conversation to another model before replying
    #[serde(default)]
    pub model_id: Option<Uuid>,
}

impl CreateMessageRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() {
            return Err("Message content must not be empty".to_string());
        }
        Ok(())
    }
}

fn default_limit() -> i64 {
    10
}

/// Pagination for the chat title listing
#[derive(Debug, Clone, Deserialize)]
pub struct TitlesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl Default for TitlesQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl TitlesQuery {
    pub fn validate(&self) -> Result<(), String> {
        if self.limit < 1 {
            return Err("limit must be greater than or equal to 1".to_string());
        }
        if self.offset < 0 {
            return Err("offset must be greater than or equal to 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTitle {
    pub conversation_id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTitlesPage {
    pub total_count: i64,
    pub conversations: Vec<ChatTitle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTitleRequest {
    pub title: String,
}

impl UpdateTitleRequest {
    pub fn validate(&self) -> Result<(), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title must not be empty".to_string());
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(format!("Title must be at most {} characters", MAX_TITLE_CHARS));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatedTitle {
    pub conversation_id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateModelRequest {
    pub model_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatedModel {
    pub conversation_id: Uuid,
    pub current_model_id: Uuid,
}
