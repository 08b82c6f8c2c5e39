// Handlers for /api/workspaces

use bytes::Bytes;
use uuid::Uuid;
use warp::http::StatusCode;

use crate::auth::{ensure_same_user, AuthUser};
use crate::error::ApiError;
use crate::handlers::parse_delete_request;
use crate::models::{CreateWorkspaceRequest, UserWorkspacesResponse};
use crate::state::AppState;

fn workspace_not_found() -> ApiError {
    ApiError::NotFound("Workspace not found".to_string())
}

pub async fn create_workspace_handler(
    user: AuthUser,
    request: CreateWorkspaceRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    request.validate().map_err(ApiError::Validation)?;

    let workspace = state
        .db
        .create_workspace(user.user_id, &request.name, request.description.as_deref())
        .await?;

    Ok(warp::reply::with_status(
        warp::reply::json(&workspace),
        StatusCode::CREATED,
    ))
}

pub async fn get_user_workspaces_handler(
    user_id: Uuid,
    user: AuthUser,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    ensure_same_user(&user, user_id)?;

    let workspaces = state.db.get_user_workspaces(user_id).await?;
    Ok(warp::reply::json(&UserWorkspacesResponse { workspaces }))
}

pub async fn delete_workspace_handler(
    workspace_id: Uuid,
    user: AuthUser,
    body: Bytes,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request = parse_delete_request(&body)?;

    state
        .db
        .delete_workspace(user.user_id, workspace_id, request.mode)
        .await?;

    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

pub async fn get_workspace_chats_handler(
    workspace_id: Uuid,
    user: AuthUser,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let workspace = state
        .db
        .get_workspace_chats(user.user_id, workspace_id)
        .await?
        .ok_or_else(workspace_not_found)?;

    Ok(warp::reply::json(&workspace))
}

pub async fn get_workspace_folders_handler(
    workspace_id: Uuid,
    user: AuthUser,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let workspace = state
        .db
        .get_workspace_folders(user.user_id, workspace_id)
        .await?
        .ok_or_else(workspace_not_found)?;

    Ok(warp::reply::json(&workspace))
}
