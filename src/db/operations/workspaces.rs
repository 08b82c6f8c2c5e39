use crate::db::error::{Error, Result};
use crate::db::operations::folders::folders_with_chats;
use crate::models::{
    DeletionMode, WorkspaceChat, WorkspaceChats, WorkspaceFolders, WorkspaceRecord,
    WorkspaceSummary,
};
use deadpool_postgres::Pool;
use tracing::{debug, info};
use uuid::Uuid;

/// Upper bound on the number of workspaces a single user may own
pub const MAX_WORKSPACES_PER_USER: i64 = 5;

/// Count the workspaces owned by a user
pub async fn count_user_workspaces(pool: &Pool, user_id: Uuid) -> Result<i64> {
    let conn = pool.get().await?;

    let row = conn
        .query_one(
            "SELECT COUNT(*) FROM workspaces WHERE user_id = $1",
            &[&user_id],
        )
        .await?;

    Ok(row.get(0))
}

/// Create a workspace, enforcing the per-user limit
///
/// The user's row is locked for the duration of the transaction so that
/// concurrent requests can't both pass the count check.
pub async fn create_workspace(
    pool: &Pool,
    user_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<WorkspaceRecord> {
    let mut conn = pool.get().await?;
    let tx = conn.transaction().await?;

    let user = tx
        .query_opt("SELECT id FROM users WHERE id = $1 FOR UPDATE", &[&user_id])
        .await?;
    if user.is_none() {
        return Err(Error::NotFoundError("User not found".to_string()));
    }

    let count: i64 = tx
        .query_one(
            "SELECT COUNT(*) FROM workspaces WHERE user_id = $1",
            &[&user_id],
        )
        .await?
        .get(0);

    if count >= MAX_WORKSPACES_PER_USER {
        return Err(Error::WorkspaceLimitExceeded {
            limit: MAX_WORKSPACES_PER_USER,
        });
    }

    let row = tx
        .query_one(
            "INSERT INTO workspaces (user_id, name, description)
             VALUES ($1, $2, $3)
             RETURNING workspace_id, user_id, name, description, created_at",
            &[&user_id, &name, &description],
        )
        .await?;

    tx.commit().await?;

    let workspace = WorkspaceRecord {
        workspace_id: row.get("workspace_id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    };

    info!(workspace_id = %workspace.workspace_id, %user_id, "Created workspace");
    Ok(workspace)
}

/// Delete a workspace, archiving or deleting what it contains
///
/// Archive sends the workspace's chats and folders to the global space.
/// Permanent deletes its chats, the chats inside its folders, and the folders.
pub async fn delete_workspace(
    pool: &Pool,
    user_id: Uuid,
    workspace_id: Uuid,
    mode: DeletionMode,
) -> Result<()> {
    let mut conn = pool.get().await?;
    let tx = conn.transaction().await?;

    let workspace = tx
        .query_opt(
            "SELECT workspace_id FROM workspaces
             WHERE workspace_id = $1 AND user_id = $2
             FOR UPDATE",
            &[&workspace_id, &user_id],
        )
        .await?;
    if workspace.is_none() {
        return Err(Error::NotFoundError("Workspace not found".to_string()));
    }

    match mode {
        DeletionMode::Archive => {
            tx.execute(
                "UPDATE conversations
                 SET workspace_id = NULL, updated_at = now()
                 WHERE workspace_id = $1",
                &[&workspace_id],
            )
            .await?;
            tx.execute(
                "UPDATE folders
                 SET workspace_id = NULL, updated_at = now()
                 WHERE workspace_id = $1",
                &[&workspace_id],
            )
            .await?;
        }
        DeletionMode::Permanent => {
            tx.execute(
                "DELETE FROM conversations
                 WHERE workspace_id = $1
                    OR folder_id IN (SELECT folder_id FROM folders WHERE workspace_id = $1)",
                &[&workspace_id],
            )
            .await?;
            tx.execute("DELETE FROM folders WHERE workspace_id = $1", &[&workspace_id])
                .await?;
        }
    }

    tx.execute(
        "DELETE FROM workspaces WHERE workspace_id = $1",
        &[&workspace_id],
    )
    .await?;

    tx.commit().await?;

    info!(%workspace_id, ?mode, "Deleted workspace");
    Ok(())
}

/// Retrieve a workspace with the chats placed directly in it
pub async fn get_workspace_chats(
    pool: &Pool,
    user_id: Uuid,
    workspace_id: Uuid,
) -> Result<Option<WorkspaceChats>> {
    let conn = pool.get().await?;

    let Some(workspace) = conn
        .query_opt(
            "SELECT workspace_id, name, description, created_at, updated_at
             FROM workspaces
             WHERE workspace_id = $1 AND user_id = $2",
            &[&workspace_id, &user_id],
        )
        .await?
    else {
        return Ok(None);
    };

    let rows = conn
        .query(
            "SELECT conversation_id, title, created_at, updated_at, current_model_id
             FROM conversations
             WHERE workspace_id = $1 AND user_id = $2
             ORDER BY updated_at DESC",
            &[&workspace_id, &user_id],
        )
        .await?;

    let chats = rows
        .iter()
        .map(|row| WorkspaceChat {
            conversation_id: row.get("conversation_id"),
            title: row.get("title"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            current_model_id: row.get("current_model_id"),
        })
        .collect();

    Ok(Some(WorkspaceChats {
        workspace_id: workspace.get("workspace_id"),
        name: workspace.get("name"),
        description: workspace.get("description"),
        created_at: workspace.get("created_at"),
        updated_at: workspace.get("updated_at"),
        chats,
    }))
}

/// Retrieve a workspace with its folders, each carrying its chats
pub async fn get_workspace_folders(
    pool: &Pool,
    user_id: Uuid,
    workspace_id: Uuid,
) -> Result<Option<WorkspaceFolders>> {
    let conn = pool.get().await?;

    let Some(workspace) = conn
        .query_opt(
            "SELECT workspace_id, name, created_at, updated_at
             FROM workspaces
             WHERE workspace_id = $1 AND user_id = $2",
            &[&workspace_id, &user_id],
        )
        .await?
    else {
        return Ok(None);
    };

    let folder_rows = conn
        .query(
            "SELECT folder_id, name, created_at, updated_at
             FROM folders
             WHERE workspace_id = $1 AND user_id = $2
             ORDER BY created_at",
            &[&workspace_id, &user_id],
        )
        .await?;

    let folders = folders_with_chats(&conn, &folder_rows).await?;
    debug!(%workspace_id, folders = folders.len(), "Loaded workspace folders");

    Ok(Some(WorkspaceFolders {
        workspace_id: workspace.get("workspace_id"),
        name: workspace.get("name"),
        created_at: workspace.get("created_at"),
        updated_at: workspace.get("updated_at"),
        folders,
    }))
}

/// List a user's workspaces, newest first
pub async fn get_user_workspaces(pool: &Pool, user_id: Uuid) -> Result<Vec<WorkspaceSummary>> {
    let conn = pool.get().await?;

    let rows = conn
        .query(
            "SELECT workspace_id, name, created_at
             FROM workspaces
             WHERE user_id = $1
             ORDER BY created_at DESC",
            &[&user_id],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| WorkspaceSummary {
            workspace_id: row.get("workspace_id"),
            name: row.get("name"),
            created_at: row.get("created_at"),
        })
        .collect())
}
