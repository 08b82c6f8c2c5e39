use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use labmise::auth::{GoogleOAuth, JwtKeys};
use labmise::config::AppConfig;
use labmise::db::Database;
use labmise::routes::configure_routes;
use labmise::services::{ModelDispatcher, ProviderRegistry};
use labmise::state::{AppState, QuizSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("labmise=info,warp=info")),
        )
        .init();

    let db = Database::new(config.database.clone())
        .await
        .context("Failed to connect to PostgreSQL")?;
    db.migrate().await.context("Failed to apply schema")?;

    let registry = Arc::new(ProviderRegistry::from_api_keys(&config.api_keys));
    let state = AppState {
        dispatcher: ModelDispatcher::new(db.clone(), registry, config.title_model.clone()),
        db,
        jwt: Arc::new(JwtKeys::new(&config.jwt_secret, config.access_token_ttl)),
        google: Arc::new(GoogleOAuth::new(
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
            config.google_redirect_uri.clone(),
        )),
        quiz: QuizSettings {
            target: config.quiz_model.clone(),
            iterations: config.quiz_iterations,
        },
    };

    let routes = configure_routes(state, &config.allowed_origins);

    info!(addr = %config.bind_addr, "Starting server");
    warp::serve(routes).run(config.bind_addr).await;

    Ok(())
}
