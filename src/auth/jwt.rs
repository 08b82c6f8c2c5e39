use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::auth::AuthError;
use crate::db::User;

pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);
pub const OAUTH_STATE_TTL: Duration = Duration::from_secs(10 * 60);

const STATE_PURPOSE: &str = "oauth_state";

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub username: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    purpose: String,
    nonce: Uuid,
    iat: u64,
    exp: u64,
}

/// HS256 signing and verification keys plus token lifetimes
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, access_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Sign an access token for a user
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let iat = now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            iat,
            exp: iat + self.access_ttl.as_secs(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check an access token's signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected access token");
                AuthError::InvalidToken
            })
    }

    /// Sign a fresh value for the OAuth `state` parameter
    pub fn issue_state(&self) -> Result<String, AuthError> {
        let iat = now();
        let claims = StateClaims {
            purpose: STATE_PURPOSE.to_string(),
            nonce: Uuid::new_v4(),
            iat,
            exp: iat + OAUTH_STATE_TTL.as_secs(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify_state(&self, state: &str) -> Result<(), AuthError> {
        let claims = decode::<StateClaims>(state, &self.decoding, &self.validation)
            .map_err(|_| AuthError::InvalidState)?
            .claims;

        if claims.purpose != STATE_PURPOSE {
            return Err(AuthError::InvalidState);
        }
        Ok(())
    }
}

fn now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}
