//! Bearer tokens and the Google sign-in flow
//!
//! [`JwtKeys`] signs and checks the HS256 access tokens handed out after a
//! successful Google login, and the short-lived `state` values that protect
//! the OAuth redirect. [`with_auth`] is the warp filter every `/api` route
//! sits behind.

pub mod filter;
pub mod google;
pub mod jwt;

use thiserror::Error;

pub use filter::{ensure_same_user, with_auth, AuthUser};
pub use google::{GoogleIdentity, GoogleOAuth};
pub use jwt::{Claims, JwtKeys};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid OAuth state")]
    InvalidState,

    #[error("User info not available in token")]
    MissingEmail,

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Token signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::OAuth(err.to_string())
    }
}
