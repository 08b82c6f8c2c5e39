// GET /api/models/ handler

use crate::auth::AuthUser;
use crate::state::AppState;

pub async fn list_models_handler(
    _user: AuthUser,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let models = state.db.list_models().await?;
    Ok(warp::reply::json(&models))
}
