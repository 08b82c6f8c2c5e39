// Rows and inputs that stay inside the service

use uuid::Uuid;

use crate::models::ChatRole;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// The name and provider service registered for a model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRoute {
    pub model_name: String,
    pub service: String,
}

/// One role/content pair of a conversation's history
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// What a reply needs: the active model and the ordered history
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub current_model_id: Uuid,
    pub turns: Vec<ChatTurn>,
}

#[derive(Debug, Clone)]
pub struct NewChat {
    pub user_id: Uuid,
    pub model_id: Uuid,
    pub title: String,
    pub workspace_id: Option<Uuid>,
    pub folder_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub role: ChatRole,
    pub model_id: Option<Uuid>,
    pub content: String,
}

impl NewMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            model_id: None,
            content: content.into(),
        }
    }

    pub fn assistant(model_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            model_id: Some(model_id),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_constructors() {
        let user = NewMessage::user("Hi");
        assert_eq!(user.role, ChatRole::User);
        assert!(user.model_id.is_none());

        let model_id = Uuid::new_v4();
        let reply = NewMessage::assistant(model_id, "Hello!");
        assert_eq!(reply.role, ChatRole::Assistant);
        assert_eq!(reply.model_id, Some(model_id));
    }
}
