//! HTTP-facing errors and the rejection handler

use std::convert::Infallible;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::auth::AuthError;
use crate::db;
use crate::llm::LlmError;
use crate::services::{DispatchError, QuizError};

/// An error returned to the client as `{"detail": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    LengthRequired(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// An upstream model provider failed
    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::LengthRequired(_) => StatusCode::LENGTH_REQUIRED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl warp::reject::Reject for ApiError {}

impl From<db::Error> for ApiError {
    fn from(err: db::Error) -> Self {
        match err {
            db::Error::NotFoundError(msg) => ApiError::NotFound(msg),
            db::Error::ValidationError(msg) => ApiError::Validation(msg),
            err @ db::Error::WorkspaceLimitExceeded { .. } => ApiError::BadRequest(err.to_string()),
            db::Error::MovementError(msg) => ApiError::BadRequest(msg),
            other => {
                error!(error = %other, "Database failure");
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::UnsupportedService(service) => {
                ApiError::BadRequest(format!("Unsupported service: {}", service))
            }
            other => {
                error!(error = %other, "Model provider failure");
                ApiError::BadGateway(format!("Model provider error: {}", other))
            }
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::ModelNotFound(_) => ApiError::NotFound("Model not found".to_string()),
            DispatchError::Database(e) => e.into(),
            DispatchError::Llm(e) => e.into(),
        }
    }
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::Llm(e) => e.into(),
            QuizError::MissingOutput(_) => {
                error!(error = %err, "Quiz generation incomplete");
                ApiError::BadGateway(err.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::Unauthorized("Not authenticated".to_string()),
            AuthError::InvalidToken => ApiError::Unauthorized("Invalid token".to_string()),
            AuthError::InvalidState => ApiError::BadRequest("Invalid OAuth state".to_string()),
            AuthError::MissingEmail => {
                ApiError::BadRequest("User info not available in token".to_string())
            }
            AuthError::OAuth(msg) => {
                warn!(error = %msg, "OAuth exchange failed");
                ApiError::BadRequest(format!("OAuth error: {}", msg))
            }
            AuthError::Token(e) => {
                error!(error = %e, "Failed to sign token");
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

// Lets handlers use `?` on db and service results.
macro_rules! reject_via_api_error {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Rejection {
                fn from(err: $ty) -> Self {
                    warp::reject::custom(ApiError::from(err))
                }
            }
        )*
    };
}

reject_via_api_error!(db::Error, LlmError, DispatchError, QuizError, AuthError);

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// Turn any rejection into a JSON error response
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, detail) = if let Some(api_error) = err.find::<ApiError>() {
        (api_error.status(), api_error.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::MissingHeader>() {
        (StatusCode::UNAUTHORIZED, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidHeader>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::UnsupportedMediaType>() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::PayloadTooLarge>() {
        (StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::LengthRequired>() {
        (StatusCode::LENGTH_REQUIRED, e.to_string())
    } else if let Some(e) = err.find::<warp::cors::CorsForbidden>() {
        (StatusCode::FORBIDDEN, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
    } else {
        error!(rejection = ?err, "Unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    if status.is_server_error() {
        error!(%status, %detail, "Request failed");
    } else {
        warn!(%status, %detail, "Request rejected");
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorBody { detail }),
        status,
    ))
}
