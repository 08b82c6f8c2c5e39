// Handlers for /api/chats

use std::convert::Infallible;

use async_stream::stream;
use futures::{Stream, StreamExt};
use tracing::{error, info, warn};
use uuid::Uuid;
use warp::http::StatusCode;
use warp::sse::Event;

use crate::auth::{ensure_same_user, AuthUser};
use crate::db::{ChatTurn, NewChat, NewMessage};
use crate::error::ApiError;
use crate::models::{
    ChatRole, CreateChatRequest, CreateMessageRequest, Location, MessageRecord, TitlesQuery,
    UpdateModelRequest, UpdateTitleRequest,
};
use crate::services::title::DEFAULT_TITLE;
use crate::services::TextStream;
use crate::sse::{create_chunk_event, create_done_event, create_error_event, create_messages_event};
use crate::state::AppState;

fn chat_not_found() -> ApiError {
    ApiError::NotFound("Chat not found".to_string())
}

/// A user message about to be answered, with the history the model will see
struct PendingExchange {
    conversation_id: Uuid,
    model_id: Uuid,
    model_changed: bool,
    content: String,
    turns: Vec<ChatTurn>,
}

impl PendingExchange {
    async fn load(
        state: &AppState,
        user_id: Uuid,
        request: CreateMessageRequest,
    ) -> Result<Self, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        let context = state
            .db
            .select_chat_context(user_id, request.conversation_id)
            .await?
            .ok_or_else(chat_not_found)?;

        let model_id = request.model_id.unwrap_or(context.current_model_id);
        let mut turns = context.turns;
        turns.push(ChatTurn::new(ChatRole::User, request.content.clone()));

        Ok(Self {
            conversation_id: request.conversation_id,
            model_id,
            model_changed: model_id != context.current_model_id,
            content: request.content,
            turns,
        })
    }

    /// Persist the user message, the reply and any model switch in one go
    async fn store(
        &self,
        state: &AppState,
        user_id: Uuid,
        reply: String,
    ) -> Result<Vec<MessageRecord>, ApiError> {
        let messages = [
            NewMessage::user(self.content.clone()),
            NewMessage::assistant(self.model_id, reply),
        ];
        let switch_model = self.model_changed.then_some(self.model_id);
        let records = state
            .db
            .insert_chat_messages(user_id, self.conversation_id, &messages, switch_model)
            .await?;

        Ok(records)
    }
}

/// The workspace or folder a new chat goes into must belong to the caller
async fn ensure_location(
    state: &AppState,
    user_id: Uuid,
    request: &CreateChatRequest,
) -> Result<(), ApiError> {
    let target = match (request.workspace_id, request.folder_id) {
        (Some(id), _) => Some((Location::workspace(id), "Workspace not found")),
        (None, Some(id)) => Some((Location::folder(id), "Folder not found")),
        (None, None) => None,
    };

    if let Some((location, missing)) = target {
        if !state.db.location_exists(user_id, &location).await? {
            return Err(ApiError::NotFound(missing.to_string()));
        }
    }
    Ok(())
}

// POST /api/chats/
pub async fn create_chat_handler(
    user: AuthUser,
    request: CreateChatRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    request.validate().map_err(ApiError::Validation)?;
    ensure_location(&state, user.user_id, &request).await?;

    let turns = vec![ChatTurn::new(ChatRole::User, request.initial_message.clone())];
    let (title, reply) = futures::join!(
        state.dispatcher.generate_title(&request.initial_message),
        state.dispatcher.reply(request.model_id, &turns),
    );
    let reply = reply?;
    let title = title.unwrap_or_else(|e| {
        warn!(error = %e, "Title generation failed, using default title");
        DEFAULT_TITLE.to_string()
    });

    let chat = state
        .db
        .insert_chat_with_messages(
            NewChat {
                user_id: user.user_id,
                model_id: request.model_id,
                title,
                workspace_id: request.workspace_id,
                folder_id: request.folder_id,
            },
            &[
                NewMessage::user(request.initial_message),
                NewMessage::assistant(request.model_id, reply),
            ],
        )
        .await?;

    Ok(warp::reply::with_status(
        warp::reply::json(&chat),
        StatusCode::CREATED,
    ))
}

// POST /api/chats/message/
pub async fn send_message_handler(
    user: AuthUser,
    request: CreateMessageRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let exchange = PendingExchange::load(&state, user.user_id, request).await?;

    let reply = state
        .dispatcher
        .reply(exchange.model_id, &exchange.turns)
        .await?;
    let records = exchange.store(&state, user.user_id, reply).await?;

    Ok(warp::reply::with_status(
        warp::reply::json(&records),
        StatusCode::CREATED,
    ))
}

// POST /api/chats/message/stream
pub async fn stream_message_handler(
    user: AuthUser,
    request: CreateMessageRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let exchange = PendingExchange::load(&state, user.user_id, request).await?;

    let text = state
        .dispatcher
        .stream_reply(exchange.model_id, &exchange.turns)
        .await?;

    info!(conversation_id = %exchange.conversation_id, "Streaming reply");
    let events = reply_events(state, user.user_id, exchange, text);

    Ok(warp::sse::reply(warp::sse::keep_alive().stream(events)))
}

fn reply_events(
    state: AppState,
    user_id: Uuid,
    exchange: PendingExchange,
    mut text: TextStream,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    stream! {
        let mut reply = String::new();

        while let Some(chunk) = text.next().await {
            match chunk {
                Ok(chunk) => {
                    reply.push_str(&chunk);
                    yield create_chunk_event(exchange.conversation_id, &chunk);
                }
                Err(e) => {
                    error!(
                        error = %e,
                        conversation_id = %exchange.conversation_id,
                        "Reply stream failed"
                    );
                    yield create_error_event(&ApiError::from(e).to_string());
                    return;
                }
            }
        }

        match exchange.store(&state, user_id, reply).await {
            Ok(records) => yield create_messages_event(&records),
            Err(e) => {
                yield create_error_event(&e.to_string());
                return;
            }
        }

        yield create_done_event();
    }
}

// GET /api/chats/{id}/
pub async fn get_chat_handler(
    chat_id: Uuid,
    user: AuthUser,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let chat = state
        .db
        .select_chat(user.user_id, chat_id)
        .await?
        .ok_or_else(chat_not_found)?;

    Ok(warp::reply::json(&chat))
}

// GET /api/chats/titles/{user_id}/
pub async fn get_chat_titles_handler(
    user_id: Uuid,
    query: TitlesQuery,
    user: AuthUser,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    ensure_same_user(&user, user_id)?;
    query.validate().map_err(ApiError::Validation)?;

    let page = state
        .db
        .select_user_chat_titles(user_id, query.limit, query.offset)
        .await?;

    Ok(warp::reply::json(&page))
}

// PATCH /api/chats/{id}/title
pub async fn update_chat_title_handler(
    chat_id: Uuid,
    user: AuthUser,
    request: UpdateTitleRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    request.validate().map_err(ApiError::Validation)?;

    let updated = state
        .db
        .update_chat_title(user.user_id, chat_id, request.title.trim())
        .await?
        .ok_or_else(chat_not_found)?;

    Ok(warp::reply::json(&updated))
}

// PATCH /api/chats/{id}/model
pub async fn update_chat_model_handler(
    chat_id: Uuid,
    user: AuthUser,
    request: UpdateModelRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let updated = state
        .db
        .update_conversation_model(user.user_id, chat_id, request.model_id)
        .await?
        .ok_or_else(chat_not_found)?;

    Ok(warp::reply::json(&updated))
}

// DELETE /api/chats/{id}/
pub async fn delete_chat_handler(
    chat_id: Uuid,
    user: AuthUser,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    if !state.db.delete_chat(user.user_id, chat_id).await? {
        return Err(chat_not_found().into());
    }

    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}
