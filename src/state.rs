use std::sync::Arc;

use crate::auth::{GoogleOAuth, JwtKeys};
use crate::db::Database;
use crate::services::{ModelDispatcher, ModelTarget};

/// Where quiz requests are sent and how many refinement passes they get
#[derive(Debug, Clone)]
pub struct QuizSettings {
    pub target: ModelTarget,
    pub iterations: usize,
}

/// Shared handles every handler can reach
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub dispatcher: ModelDispatcher,
    pub jwt: Arc<JwtKeys>,
    pub google: Arc<GoogleOAuth>,
    pub quiz: QuizSettings,
}
