// GET /google/login and GET /auth/callback handlers

use tracing::{info, warn};
use warp::http::Uri;

use crate::error::ApiError;
use crate::models::{CallbackQuery, TokenResponse};
use crate::state::AppState;

pub async fn google_login_handler(state: AppState) -> Result<impl warp::Reply, warp::Rejection> {
    let oauth_state = state.jwt.issue_state()?;
    let url = state.google.authorize_url(&oauth_state)?;

    let uri: Uri = url
        .as_str()
        .parse()
        .map_err(|e| ApiError::Internal(format!("Bad authorization URL: {}", e)))?;

    Ok(warp::redirect::found(uri))
}

pub async fn auth_callback_handler(
    query: CallbackQuery,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    if let Some(error) = query.error {
        warn!(%error, "Google returned an error to the callback");
        return Err(ApiError::BadRequest(format!("OAuth error: {}", error)).into());
    }

    let oauth_state = query
        .state
        .ok_or_else(|| ApiError::BadRequest("Missing OAuth state".to_string()))?;
    state.jwt.verify_state(&oauth_state)?;

    let code = query
        .code
        .ok_or_else(|| ApiError::BadRequest("Missing authorization code".to_string()))?;

    let identity = state.google.authenticate(&code).await?;
    let user = state
        .db
        .get_or_create_user(&identity.email, &identity.username)
        .await?;

    let token = state.jwt.issue(&user)?;
    info!(user_id = %user.id, "Issued access token");

    Ok(warp::reply::json(&TokenResponse::bearer(token)))
}
