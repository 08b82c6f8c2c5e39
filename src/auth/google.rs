use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::AuthError;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPE: &str = "openid email profile";

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokens {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Who signed in, as reported by Google
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleIdentity {
    pub email: String,
    pub username: String,
}

impl GoogleUserInfo {
    pub fn into_identity(self) -> Result<GoogleIdentity, AuthError> {
        let email = self
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or(AuthError::MissingEmail)?;

        let username = match self.name.filter(|name| !name.trim().is_empty()) {
            Some(name) => name,
            None => email.split('@').next().unwrap_or_default().to_string(),
        };

        Ok(GoogleIdentity { email, username })
    }
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Google OAuth 2.0 authorization-code client
#[derive(Clone)]
pub struct GoogleOAuth {
    http_client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleOAuth {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            http_client: Client::new(),
            client_id,
            client_secret,
            redirect_uri,
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            userinfo_url: USERINFO_URL.to_string(),
        }
    }

    /// Point the token and userinfo calls somewhere else (mock servers in tests)
    pub fn with_endpoints(
        mut self,
        token_url: impl Into<String>,
        userinfo_url: impl Into<String>,
    ) -> Self {
        self.token_url = token_url.into();
        self.userinfo_url = userinfo_url.into();
        self
    }

    /// The Google consent page URL to redirect the browser to
    pub fn authorize_url(&self, state: &str) -> Result<Url, AuthError> {
        Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPE),
                ("state", state),
                ("access_type", "offline"),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| AuthError::OAuth(e.to_string()))
    }

    pub async fn exchange_code(&self, code: &str) -> Result<GoogleTokens, AuthError> {
        debug!("Exchanging authorization code");

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<GoogleErrorBody>(&body) {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => format!("token endpoint returned {}", status),
            };
            return Err(AuthError::OAuth(message));
        }

        Ok(response.json().await?)
    }

    pub async fn fetch_user_info(&self, access_token: &str) -> Result<GoogleUserInfo, AuthError> {
        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::OAuth(format!(
                "userinfo endpoint returned {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Run the whole callback leg: code for tokens, tokens for identity
    pub async fn authenticate(&self, code: &str) -> Result<GoogleIdentity, AuthError> {
        let tokens = self.exchange_code(code).await?;
        let identity = self.fetch_user_info(&tokens.access_token).await?.into_identity()?;
        info!(email = %identity.email, "Google sign-in completed");
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oauth() -> GoogleOAuth {
        GoogleOAuth::new(
            "client-123".to_string(),
            "shh".to_string(),
            "http://localhost:8000/auth/callback".to_string(),
        )
    }

    #[test]
    fn test_authorize_url_parameters() {
        let url = oauth().authorize_url("state-abc").unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["redirect_uri"], "http://localhost:8000/auth/callback");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "openid email profile");
        assert_eq!(params["state"], "state-abc");
    }

    #[test]
    fn test_identity_requires_email() {
        let info = GoogleUserInfo {
            sub: Some("1".to_string()),
            email: None,
            name: Some("Ada".to_string()),
        };
        assert!(matches!(info.into_identity(), Err(AuthError::MissingEmail)));
    }

    #[test]
    fn test_identity_falls_back_to_email_name() {
        let info = GoogleUserInfo {
            sub: None,
            email: Some("grace@example.com".to_string()),
            name: None,
        };
        let identity = info.into_identity().unwrap();
        assert_eq!(identity.username, "grace");
        assert_eq!(identity.email, "grace@example.com");
    }

    #[tokio::test]
    async fn test_authenticate_against_mock_endpoints() {
        use wiremock::matchers::{body_string_contains, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=auth-code"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "id_token": "header.payload.sig"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer ya29.token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "42",
                "email": "ada@example.com",
                "name": "Ada Lovelace"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = oauth().with_endpoints(
            format!("{}/token", server.uri()),
            format!("{}/userinfo", server.uri()),
        );
        let identity = client.authenticate("auth-code").await.unwrap();

        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(identity.username, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_exchange_code_reports_google_error() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Bad Request"
            })))
            .mount(&server)
            .await;

        let client = oauth().with_endpoints(server.uri(), server.uri());
        let result = client.exchange_code("stale").await;
        assert!(matches!(result, Err(AuthError::OAuth(msg)) if msg == "Bad Request"));
    }
}
