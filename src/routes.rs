// Route definitions

use std::convert::Infallible;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use warp::http::Method;
use warp::Filter;

use crate::auth::{with_auth, AuthUser};
use crate::error::{handle_rejection, ApiError};
use crate::handlers;
use crate::models::{CallbackQuery, TitlesQuery};
use crate::state::AppState;

const MAX_JSON_BODY_BYTES: u64 = 64 * 1024;

pub fn with_state(
    state: AppState,
) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_JSON_BODY_BYTES).and(warp::body::json())
}

/// Optional DELETE body, capped like JSON bodies
///
/// Without `Content-Length` the body must not be chunked and reads as empty.
fn optional_body() -> impl Filter<Extract = (Bytes,), Error = warp::Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and(warp::header::optional::<String>("transfer-encoding"))
        .and_then(|length: Option<u64>, encoding: Option<String>| async move {
            match (length, encoding) {
                (Some(length), _) if length > MAX_JSON_BODY_BYTES => Err(warp::reject::custom(
                    ApiError::PayloadTooLarge("Request body is too large".to_string()),
                )),
                (None, Some(_)) => Err(warp::reject::custom(ApiError::LengthRequired(
                    "A content-length header is required".to_string(),
                ))),
                _ => Ok(()),
            }
        })
        .untuple_one()
        .and(warp::body::bytes())
}

fn authenticated(
    state: &AppState,
) -> impl Filter<Extract = (AuthUser,), Error = warp::Rejection> + Clone {
    with_auth(state.jwt.clone())
}

/// Every route plus CORS, request tracing and JSON error bodies
pub fn configure_routes(
    state: AppState,
    allowed_origins: &[String],
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    let cors = warp::cors()
        .allow_origins(allowed_origins.iter().map(String::as_str))
        .allow_credentials(true)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(vec!["authorization", "content-type"]);

    // GET /
    let root = warp::path::end()
        .and(warp::get())
        .and_then(handlers::root_handler);

    root.or(auth_routes(state.clone()))
        .or(model_routes(state.clone()))
        .or(chat_routes(state.clone()))
        .or(workspace_routes(state.clone()))
        .or(folder_routes(state.clone()))
        .or(movement_routes(state.clone()))
        .or(quiz_routes(state))
        .recover(handle_rejection)
        .with(cors)
        // Origins the CORS layer refuses
        .recover(handle_rejection)
        .with(warp::trace::request())
}

pub fn auth_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // GET /google/login
    let login = warp::path!("google" / "login")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::google_login_handler);

    // GET /auth/callback?code&state
    let callback = warp::path!("auth" / "callback")
        .and(warp::get())
        .and(warp::query::<CallbackQuery>())
        .and(with_state(state))
        .and_then(handlers::auth_callback_handler);

    login.or(callback)
}

pub fn model_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // GET /api/models/
    warp::path!("api" / "models")
        .and(warp::get())
        .and(authenticated(&state))
        .and(with_state(state))
        .and_then(handlers::list_models_handler)
}

pub fn chat_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let auth = authenticated(&state);

    // POST /api/chats/
    let create = warp::path!("api" / "chats")
        .and(warp::post())
        .and(auth.clone())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::create_chat_handler);

    // POST /api/chats/message/
    let message = warp::path!("api" / "chats" / "message")
        .and(warp::post())
        .and(auth.clone())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::send_message_handler);

    // POST /api/chats/message/stream
    let stream = warp::path!("api" / "chats" / "message" / "stream")
        .and(warp::post())
        .and(auth.clone())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::stream_message_handler);

    // GET /api/chats/titles/{user_id}/?limit&offset
    let titles = warp::path!("api" / "chats" / "titles" / Uuid)
        .and(warp::get())
        .and(warp::query::<TitlesQuery>())
        .and(auth.clone())
        .and(with_state(state.clone()))
        .and_then(handlers::get_chat_titles_handler);

    // GET /api/chats/{id}/
    let get = warp::path!("api" / "chats" / Uuid)
        .and(warp::get())
        .and(auth.clone())
        .and(with_state(state.clone()))
        .and_then(handlers::get_chat_handler);

    // PATCH /api/chats/{id}/title
    let title = warp::path!("api" / "chats" / Uuid / "title")
        .and(warp::patch())
        .and(auth.clone())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::update_chat_title_handler);

    // PATCH /api/chats/{id}/model
    let model = warp::path!("api" / "chats" / Uuid / "model")
        .and(warp::patch())
        .and(auth.clone())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::update_chat_model_handler);

    // DELETE /api/chats/{id}/
    let delete = warp::path!("api" / "chats" / Uuid)
        .and(warp::delete())
        .and(auth)
        .and(with_state(state))
        .and_then(handlers::delete_chat_handler);

    create
        .or(message)
        .or(stream)
        .or(titles)
        .or(get)
        .or(title)
        .or(model)
        .or(delete)
}

pub fn workspace_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let auth = authenticated(&state);

    // POST /api/workspaces/
    let create = warp::path!("api" / "workspaces")
        .and(warp::post())
        .and(auth.clone())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::create_workspace_handler);

    // GET /api/workspaces/user/{user_id}
    let list = warp::path!("api" / "workspaces" / "user" / Uuid)
        .and(warp::get())
        .and(auth.clone())
        .and(with_state(state.clone()))
        .and_then(handlers::get_user_workspaces_handler);

    // DELETE /api/workspaces/{id}
    let delete = warp::path!("api" / "workspaces" / Uuid)
        .and(warp::delete())
        .and(auth.clone())
        .and(optional_body())
        .and(with_state(state.clone()))
        .and_then(handlers::delete_workspace_handler);

    // GET /api/workspaces/{id}/chats
    let chats = warp::path!("api" / "workspaces" / Uuid / "chats")
        .and(warp::get())
        .and(auth.clone())
        .and(with_state(state.clone()))
        .and_then(handlers::get_workspace_chats_handler);

    // GET /api/workspaces/{id}/folders
    let folders = warp::path!("api" / "workspaces" / Uuid / "folders")
        .and(warp::get())
        .and(auth)
        .and(with_state(state))
        .and_then(handlers::get_workspace_folders_handler);

    create.or(list).or(delete).or(chats).or(folders)
}

pub fn folder_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let auth = authenticated(&state);

    // POST /api/folders/
    let create = warp::path!("api" / "folders")
        .and(warp::post())
        .and(auth.clone())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::create_folder_handler);

    // DELETE /api/folders/{id}
    let delete = warp::path!("api" / "folders" / Uuid)
        .and(warp::delete())
        .and(auth.clone())
        .and(optional_body())
        .and(with_state(state.clone()))
        .and_then(handlers::delete_folder_handler);

    // GET /api/folders/global/{user_id}
    let global = warp::path!("api" / "folders" / "global" / Uuid)
        .and(warp::get())
        .and(auth)
        .and(with_state(state))
        .and_then(handlers::get_global_folders_handler);

    create.or(delete).or(global)
}

pub fn movement_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // POST /api/move/
    warp::path!("api" / "move")
        .and(warp::post())
        .and(authenticated(&state))
        .and(json_body())
        .and(with_state(state))
        .and_then(handlers::move_item_handler)
}

pub fn quiz_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // POST /api/quiz/
    warp::path!("api" / "quiz")
        .and(warp::post())
        .and(authenticated(&state))
        .and(json_body())
        .and(with_state(state))
        .and_then(handlers::generate_quiz_handler)
}
