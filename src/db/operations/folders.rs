use std::collections::HashMap;

use crate::db::error::{Error, Result};
use crate::models::{ChatSummary, DeletionMode, FolderRecord, FolderWithChats};
use deadpool_postgres::{Client, Pool};
use tokio_postgres::Row;
use tracing::info;
use uuid::Uuid;

/// Attach each folder's chats to the given folder rows, keeping row order
pub(crate) async fn folders_with_chats(
    conn: &Client,
    folder_rows: &[Row],
) -> Result<Vec<FolderWithChats>> {
    if folder_rows.is_empty() {
        return Ok(Vec::new());
    }

    let folder_ids: Vec<Uuid> = folder_rows.iter().map(|row| row.get("folder_id")).collect();

    let chat_rows = conn
        .query(
            "SELECT folder_id, conversation_id, title, created_at, updated_at
             FROM conversations
             WHERE folder_id = ANY($1)
             ORDER BY updated_at DESC",
            &[&folder_ids],
        )
        .await?;

    let mut by_folder: HashMap<Uuid, Vec<ChatSummary>> = HashMap::new();
    for row in &chat_rows {
        by_folder
            .entry(row.get("folder_id"))
            .or_default()
            .push(ChatSummary {
                conversation_id: row.get("conversation_id"),
                title: row.get("title"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            });
    }

    Ok(folder_rows
        .iter()
        .map(|row| {
            let folder_id: Uuid = row.get("folder_id");
            FolderWithChats {
                folder_id,
                name: row.get("name"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
                conversations: by_folder.remove(&folder_id).unwrap_or_default(),
            }
        })
        .collect())
}

/// Create a folder in the global space or in one of the user's workspaces
pub async fn create_folder(
    pool: &Pool,
    user_id: Uuid,
    name: &str,
    workspace_id: Option<Uuid>,
) -> Result<FolderRecord> {
    let conn = pool.get().await?;

    if let Some(workspace_id) = workspace_id {
        let workspace = conn
            .query_opt(
                "SELECT 1 FROM workspaces WHERE workspace_id = $1 AND user_id = $2",
                &[&workspace_id, &user_id],
            )
            .await?;
        if workspace.is_none() {
            return Err(Error::NotFoundError(
                "Workspace not found for the user".to_string(),
            ));
        }
    }

    let row = conn
        .query_one(
            "INSERT INTO folders (user_id, workspace_id, name)
             VALUES ($1, $2, $3)
             RETURNING folder_id, name, created_at, updated_at, user_id, workspace_id",
            &[&user_id, &workspace_id, &name],
        )
        .await?;

    let folder = FolderRecord {
        folder_id: row.get("folder_id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        user_id: row.get("user_id"),
        workspace_id: row.get("workspace_id"),
    };

    info!(folder_id = %folder.folder_id, %user_id, "Created folder");
    Ok(folder)
}

/// Delete a folder; its chats go to the global space or are deleted with it
pub async fn delete_folder(
    pool: &Pool,
    user_id: Uuid,
    folder_id: Uuid,
    mode: DeletionMode,
) -> Result<()> {
    let mut conn = pool.get().await?;
    let tx = conn.transaction().await?;

    let folder = tx
        .query_opt(
            "SELECT folder_id FROM folders
             WHERE folder_id = $1 AND user_id = $2
             FOR UPDATE",
            &[&folder_id, &user_id],
        )
        .await?;
    if folder.is_none() {
        return Err(Error::NotFoundError("Folder not found".to_string()));
    }

    match mode {
        DeletionMode::Archive => {
            tx.execute(
                "UPDATE conversations
                 SET folder_id = NULL, updated_at = now()
                 WHERE folder_id = $1",
                &[&folder_id],
            )
            .await?;
        }
        DeletionMode::Permanent => {
            tx.execute(
                "DELETE FROM conversations WHERE folder_id = $1",
                &[&folder_id],
            )
            .await?;
        }
    }

    tx.execute("DELETE FROM folders WHERE folder_id = $1", &[&folder_id])
        .await?;

    tx.commit().await?;

    info!(%folder_id, ?mode, "Deleted folder");
    Ok(())
}

/// List the user's folders that sit in the global space, with their chats
pub async fn get_user_global_folders(pool: &Pool, user_id: Uuid) -> Result<Vec<FolderWithChats>> {
    let conn = pool.get().await?;

    let folder_rows = conn
        .query(
            "SELECT folder_id, name, created_at, updated_at
             FROM folders
             WHERE user_id = $1 AND workspace_id IS NULL
             ORDER BY created_at",
            &[&user_id],
        )
        .await?;

    folders_with_chats(&conn, &folder_rows).await
}
