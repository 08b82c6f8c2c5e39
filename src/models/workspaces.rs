// Workspace schemas

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_WORKSPACE_NAME_CHARS: usize = 100;
pub const MAX_WORKSPACE_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateWorkspaceRequest {
    pub fn validate(&self) -> Result<(), String> {
        let name_len = self.name.chars().count();
        if name_len == 0 || name_len > MAX_WORKSPACE_NAME_CHARS {
            return Err(format!(
                "Workspace name must be between 1 and {} characters",
                MAX_WORKSPACE_NAME_CHARS
            ));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_WORKSPACE_DESCRIPTION_CHARS {
                return Err(format!(
                    "Workspace description must be at most {} characters",
                    MAX_WORKSPACE_DESCRIPTION_CHARS
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceSummary {
    pub workspace_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWorkspacesResponse {
    pub workspaces: Vec<WorkspaceSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceChat {
    pub conversation_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub current_model_id: Uuid,
}

/// A workspace with the chats placed directly in it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceChats {
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub chats: Vec<WorkspaceChat>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatSummary {
    pub conversation_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderWithChats {
    pub folder_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub conversations: Vec<ChatSummary>,
}

/// A workspace with its folders, each carrying its chats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceFolders {
    pub workspace_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub folders: Vec<FolderWithChats>,
}

/// What happens to the contents of a deleted workspace or folder
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeletionMode {
    /// Contents move to the global space
    #[default]
    Archive,
    /// Contents are deleted along with the container
    Permanent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub mode: DeletionMode,
}
