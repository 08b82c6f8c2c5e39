use std::sync::Arc;

use uuid::Uuid;
use warp::{Filter, Rejection};

use crate::auth::{AuthError, JwtKeys};
use crate::error::ApiError;

/// The caller behind a verified bearer token
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
}

/// Require `Authorization: Bearer <token>` and extract the caller
pub fn with_auth(
    keys: Arc<JwtKeys>,
) -> impl Filter<Extract = (AuthUser,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let keys = keys.clone();
        async move {
            authorize(&keys, header.as_deref())
                .map_err(|e| warp::reject::custom(ApiError::from(e)))
        }
    })
}

pub fn authorize(keys: &JwtKeys, header: Option<&str>) -> Result<AuthUser, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;

    let token = match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => return Err(AuthError::MissingToken),
    };
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let claims = keys.verify(token)?;
    Ok(AuthUser {
        user_id: claims.sub,
        email: claims.email,
        username: claims.username,
    })
}

/// Paths that name a user must name the caller
pub fn ensure_same_user(user: &AuthUser, user_id: Uuid) -> Result<(), ApiError> {
    if user.user_id != user_id {
        return Err(ApiError::Forbidden(
            "Not allowed to access another user's data".to_string(),
        ));
    }
    Ok(())
}
