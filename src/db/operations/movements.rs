use crate::db::error::{Error, Result};
use crate::models::{ItemType, Location, LocationType, MoveRequest, MoveResponse};
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tracing::info;
use uuid::Uuid;

fn location_sql(item_type: ItemType, lock: bool) -> String {
    let base = match item_type {
        ItemType::Chat => {
            "SELECT workspace_id, folder_id FROM conversations
             WHERE conversation_id = $1 AND user_id = $2"
        }
        ItemType::Folder => {
            "SELECT workspace_id, NULL::uuid AS folder_id FROM folders
             WHERE folder_id = $1 AND user_id = $2"
        }
    };

    if lock {
        format!("{} FOR UPDATE", base)
    } else {
        base.to_string()
    }
}

// Workspace wins over folder; neither means global.
fn location_from_row(row: &Row) -> Location {
    let workspace_id: Option<Uuid> = row.get("workspace_id");
    let folder_id: Option<Uuid> = row.get("folder_id");

    match (workspace_id, folder_id) {
        (Some(id), _) => Location::workspace(id),
        (None, Some(id)) => Location::folder(id),
        (None, None) => Location::global(),
    }
}

fn ownership_sql(location_type: LocationType) -> Option<&'static str> {
    match location_type {
        LocationType::Global => None,
        LocationType::Workspace => {
            Some("SELECT 1 FROM workspaces WHERE workspace_id = $1 AND user_id = $2")
        }
        LocationType::Folder => Some("SELECT 1 FROM folders WHERE folder_id = $1 AND user_id = $2"),
    }
}

fn item_not_found(item_type: ItemType, item_id: Uuid) -> Error {
    Error::MovementError(format!("{} with id {} not found", item_type, item_id))
}

/// Determine where a chat or folder currently lives
pub async fn get_current_location(
    pool: &Pool,
    user_id: Uuid,
    item_type: ItemType,
    item_id: Uuid,
) -> Result<Location> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt(location_sql(item_type, false).as_str(), &[&item_id, &user_id])
        .await?
        .ok_or_else(|| item_not_found(item_type, item_id))?;

    Ok(location_from_row(&row))
}

/// Check that a location exists and belongs to the user
///
/// The global space always exists. A location missing its id does not.
pub async fn location_exists(pool: &Pool, user_id: Uuid, location: &Location) -> Result<bool> {
    let Some(sql) = ownership_sql(location.location_type) else {
        return Ok(true);
    };
    let Some(id) = location.id else {
        return Ok(false);
    };

    let conn = pool.get().await?;
    let row = conn.query_opt(sql, &[&id, &user_id]).await?;
    Ok(row.is_some())
}

/// Move a chat or folder to a new location
///
/// The item row is locked for the whole transaction. Folders may only move
/// to the global space or a workspace.
pub async fn move_item(pool: &Pool, user_id: Uuid, request: &MoveRequest) -> Result<MoveResponse> {
    let MoveRequest {
        item_type,
        item_id,
        destination,
    } = *request;

    let mut conn = pool.get().await?;
    let tx = conn.transaction().await?;

    let row = tx
        .query_opt(location_sql(item_type, true).as_str(), &[&item_id, &user_id])
        .await?
        .ok_or_else(|| item_not_found(item_type, item_id))?;
    let previous_location = location_from_row(&row);

    if item_type == ItemType::Folder && destination.location_type == LocationType::Folder {
        return Err(Error::MovementError(
            "Folders cannot be nested inside other folders".to_string(),
        ));
    }

    if let Some(sql) = ownership_sql(destination.location_type) {
        let id = destination
            .id
            .ok_or_else(|| {
                Error::ValidationError("Non-global locations must have an ID".to_string())
            })?;
        if tx.query_opt(sql, &[&id, &user_id]).await?.is_none() {
            return Err(Error::MovementError(format!(
                "{} with id {} not found",
                destination.location_type, id
            )));
        }
    }

    let (workspace_id, folder_id) = destination.columns();
    let updated = match item_type {
        ItemType::Chat => {
            tx.execute(
                "UPDATE conversations
                 SET workspace_id = $1, folder_id = $2, updated_at = now()
                 WHERE conversation_id = $3",
                &[&workspace_id, &folder_id, &item_id],
            )
            .await?
        }
        ItemType::Folder => {
            tx.execute(
                "UPDATE folders
                 SET workspace_id = $1, updated_at = now()
                 WHERE folder_id = $2",
                &[&workspace_id, &item_id],
            )
            .await?
        }
    };

    if updated == 0 {
        return Err(Error::MovementError(format!("Failed to update {}", item_type)));
    }

    tx.commit().await?;

    info!(
        %item_type,
        %item_id,
        from = %previous_location.location_type,
        to = %destination.location_type,
        "Moved item"
    );

    Ok(MoveResponse {
        item_type,
        item_id,
        previous_location,
        new_location: destination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_sql_locks_on_request() {
        assert!(location_sql(ItemType::Chat, true).ends_with("FOR UPDATE"));
        assert!(!location_sql(ItemType::Folder, false).contains("FOR UPDATE"));
    }

    #[test]
    fn test_global_needs_no_ownership_check() {
        assert!(ownership_sql(LocationType::Global).is_none());
        assert!(ownership_sql(LocationType::Workspace).is_some());
        assert!(ownership_sql(LocationType::Folder).is_some());
    }

    #[test]
    fn test_item_not_found_message() {
        let id = Uuid::nil();
        assert_eq!(
            item_not_found(ItemType::Chat, id).to_string(),
            format!("chat with id {} not found", id)
        );
    }
}
