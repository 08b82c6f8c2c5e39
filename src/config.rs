//! Process configuration read from the environment (and `.env`)

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::db::DbConfig;
use crate::llm::Service;
use crate::services::ModelTarget;

const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 3600;
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_TITLE_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_QUIZ_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_QUIZ_ITERATIONS: usize = 2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database: DbConfig,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub allowed_origins: Vec<String>,
    pub api_keys: HashMap<Service, String>,
    pub title_model: ModelTarget,
    pub quiz_model: ModelTarget,
    pub quiz_iterations: usize,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let bind_addr = parse_or(
            "BIND_ADDR",
            get("BIND_ADDR"),
            SocketAddr::from(([127, 0, 0, 1], 8000)),
        )?;

        let database = match get("DATABASE_URL") {
            Some(url) => DbConfig::from_connection_string(&url).map_err(|e| ConfigError::Invalid {
                key: "DATABASE_URL",
                reason: e.to_string(),
            })?,
            None => {
                let defaults = DbConfig::default();
                DbConfig {
                    host: get("DB_HOST").unwrap_or(defaults.host.clone()),
                    port: parse_or("DB_PORT", get("DB_PORT"), defaults.port)?,
                    database: get("DB_NAME").unwrap_or(defaults.database.clone()),
                    user: get("DB_USER").unwrap_or(defaults.user.clone()),
                    password: get("DB_PASSWORD").unwrap_or_default(),
                    ..defaults
                }
            }
        };
        let database = DbConfig {
            max_pool_size: parse_or(
                "DB_MAX_POOL_SIZE",
                get("DB_MAX_POOL_SIZE"),
                database.max_pool_size,
            )?,
            ..database
        };

        let ttl_secs = parse_or(
            "ACCESS_TOKEN_TTL_SECS",
            get("ACCESS_TOKEN_TTL_SECS"),
            DEFAULT_ACCESS_TOKEN_TTL_SECS,
        )?;

        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(origins) => origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(normalize_origin)
                .collect::<Result<Vec<_>, _>>()?,
            None => vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
        };

        let api_keys = Service::ALL
            .into_iter()
            .filter_map(|service| get(service.api_key_env()).map(|key| (service, key)))
            .collect();

        let title_model = ModelTarget::new(
            parse_or("TITLE_SERVICE", get("TITLE_SERVICE"), Service::Groq)?,
            get("TITLE_MODEL").unwrap_or_else(|| DEFAULT_TITLE_MODEL.to_string()),
        );
        let quiz_model = ModelTarget::new(
            parse_or("QUIZ_SERVICE", get("QUIZ_SERVICE"), Service::Gemini)?,
            get("QUIZ_MODEL").unwrap_or_else(|| DEFAULT_QUIZ_MODEL.to_string()),
        );
        let quiz_iterations = parse_or(
            "QUIZ_ITERATIONS",
            get("QUIZ_ITERATIONS"),
            DEFAULT_QUIZ_ITERATIONS,
        )?;

        Ok(Self {
            bind_addr,
            database,
            jwt_secret: require("JWT_SECRET_KEY")?,
            access_token_ttl: Duration::from_secs(ttl_secs),
            google_client_id: require("GOOGLE_CLIENT_ID")?,
            google_client_secret: require("GOOGLE_CLIENT_SECRET")?,
            google_redirect_uri: require("GOOGLE_REDIRECT_URI")?,
            allowed_origins,
            api_keys,
            title_model,
            quiz_model,
            quiz_iterations,
        })
    }
}

/// Reduce a URL to `scheme://host[:port]`, the form CORS matching expects
fn normalize_origin(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "ALLOWED_ORIGINS",
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(format!("{}: {}", raw, e)))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(invalid(format!("{} is not an http(s) origin", raw)));
    }
    Ok(origin.ascii_serialization())
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("JWT_SECRET_KEY", "secret"),
        ("GOOGLE_CLIENT_ID", "client"),
        ("GOOGLE_CLIENT_SECRET", "client-secret"),
        ("GOOGLE_REDIRECT_URI", "http://localhost:8000/auth/callback"),
    ];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.access_token_ttl, Duration::from_secs(3600));
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
        assert!(config.api_keys.is_empty());
        assert_eq!(config.title_model, ModelTarget::new(Service::Groq, DEFAULT_TITLE_MODEL));
        assert_eq!(config.quiz_model.service, Service::Gemini);
        assert_eq!(config.quiz_iterations, 2);
    }

    #[test]
    fn test_missing_jwt_secret() {
        let result = AppConfig::from_lookup(lookup(&REQUIRED[1..]));
        assert!(matches!(result, Err(ConfigError::Missing("JWT_SECRET_KEY"))));
    }

    #[test]
    fn test_database_url_and_pool_size() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DATABASE_URL", "postgresql://app:pw@db.internal:6543/chat"));
        pairs.push(("DB_MAX_POOL_SIZE", "4"));

        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.database, "chat");
        assert_eq!(config.database.max_pool_size, 4);
    }

    #[test]
    fn test_discrete_database_settings() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("DB_HOST", "pg"),
            ("DB_PORT", "5433"),
            ("DB_NAME", "labmise_dev"),
            ("DB_USER", "dev"),
            ("DB_PASSWORD", "devpw"),
        ]);

        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.database.host, "pg");
        assert_eq!(config.database.port, 5433);
        assert_eq!(config.database.user, "dev");
        assert_eq!(config.database.password, "devpw");
    }

    #[test]
    fn test_api_keys_and_origins() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("GROQ_API_KEY", "gsk-1"),
            ("OPENAI_API_KEY", " "),
            ("ALLOWED_ORIGINS", "https://app.example.com/, http://localhost:5173"),
        ]);

        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.api_keys.get(&Service::Groq).map(String::as_str), Some("gsk-1"));
        assert!(!config.api_keys.contains_key(&Service::OpenAi));
        assert_eq!(
            config.allowed_origins,
            vec!["https://app.example.com", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_invalid_values() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DB_PORT", "not-a-port"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { key: "DB_PORT", .. })
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("QUIZ_SERVICE", "anthropic"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { key: "QUIZ_SERVICE", .. })
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ALLOWED_ORIGINS", "not a url"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { key: "ALLOWED_ORIGINS", .. })
        ));
    }
}
