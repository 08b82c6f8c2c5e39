// Handlers for /api/folders

use bytes::Bytes;
use uuid::Uuid;
use warp::http::StatusCode;

use crate::auth::{ensure_same_user, AuthUser};
use crate::error::ApiError;
use crate::handlers::parse_delete_request;
use crate::models::{CreateFolderRequest, LocationType};
use crate::state::AppState;

pub async fn create_folder_handler(
    user: AuthUser,
    request: CreateFolderRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    request.validate().map_err(ApiError::Validation)?;

    let workspace_id = match request.location.location_type {
        LocationType::Folder => {
            return Err(ApiError::BadRequest(
                "Folders cannot be created inside other folders".to_string(),
            )
            .into())
        }
        LocationType::Workspace => request.location.id,
        LocationType::Global => None,
    };

    let folder = state
        .db
        .create_folder(user.user_id, request.name.trim(), workspace_id)
        .await?;

    Ok(warp::reply::with_status(
        warp::reply::json(&folder),
        StatusCode::CREATED,
    ))
}

pub async fn delete_folder_handler(
    folder_id: Uuid,
    user: AuthUser,
    body: Bytes,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request = parse_delete_request(&body)?;

    state
        .db
        .delete_folder(user.user_id, folder_id, request.mode)
        .await?;

    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

pub async fn get_global_folders_handler(
    user_id: Uuid,
    user: AuthUser,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    ensure_same_user(&user, user_id)?;

    let folders = state.db.get_user_global_folders(user_id).await?;
    Ok(warp::reply::json(&folders))
}
