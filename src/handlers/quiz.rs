// POST /api/quiz/ handler

use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{QuizRequest, QuizResponse};
use crate::services::QuizPipeline;
use crate::state::AppState;

pub async fn generate_quiz_handler(
    user: AuthUser,
    request: QuizRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    request.validate().map_err(ApiError::Validation)?;

    let target = &state.quiz.target;
    let provider = state.dispatcher.registry().get(target.service)?;

    info!(user_id = %user.user_id, model = %target.model, "Generating quiz");
    let quiz = QuizPipeline::new(provider, target.model.clone())
        .with_max_iterations(state.quiz.iterations)
        .generate(request.topic)
        .await?;

    Ok(warp::reply::json(&QuizResponse { quiz }))
}
