// POST /api/move/ handler

use tracing::info;
use warp::http::StatusCode;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::MoveRequest;
use crate::state::AppState;

pub async fn move_item_handler(
    user: AuthUser,
    request: MoveRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    request.validate().map_err(ApiError::Validation)?;

    let moved = state.db.move_item(user.user_id, &request).await?;
    info!(
        item_type = %moved.item_type,
        item_id = %moved.item_id,
        from = %moved.previous_location.location_type,
        to = %moved.new_location.location_type,
        "Moved item"
    );

    Ok(warp::reply::with_status(
        warp::reply::json(&moved),
        StatusCode::CREATED,
    ))
}
