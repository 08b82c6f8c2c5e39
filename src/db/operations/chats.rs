use crate::db::{
    error::{Error, Result},
    types::{ChatContext, ChatTurn, NewChat, NewMessage},
};
use crate::models::{
    ChatRole, ChatTitle, ChatTitlesPage, ChatWithMessages, MessageRecord, UpdatedModel,
    UpdatedTitle,
};
use deadpool_postgres::{Pool, Transaction};
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;
use tracing::{debug, info};
use uuid::Uuid;

fn parse_role(value: &str) -> Result<ChatRole> {
    value.parse::<ChatRole>().map_err(Error::DatabaseError)
}

/// Parse a message row from the database
pub(crate) fn parse_message_row(row: &Row) -> Result<MessageRecord> {
    let role: String = row.get("role");

    Ok(MessageRecord {
        message_id: row.get("message_id"),
        conversation_id: row.get("conversation_id"),
        role: parse_role(&role)?,
        model_id: row.get("model_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    })
}

fn parse_chat_row(row: &Row, messages: Vec<MessageRecord>) -> ChatWithMessages {
    ChatWithMessages {
        conversation_id: row.get("conversation_id"),
        current_model_id: row.get("current_model_id"),
        title: row.get("title"),
        workspace_id: row.get("workspace_id"),
        folder_id: row.get("folder_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        messages,
    }
}

/// Insert a batch of messages inside an open transaction
///
/// Rows are inserted in slice order, so `message_id` order matches it. The
/// conversation's `updated_at` is bumped so recent chats sort first.
async fn insert_messages_in(
    tx: &Transaction<'_>,
    conversation_id: Uuid,
    messages: &[NewMessage],
) -> Result<Vec<MessageRecord>> {
    if messages.is_empty() {
        return Ok(Vec::new());
    }

    let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
    let mut placeholders = Vec::with_capacity(messages.len());
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(messages.len() * 4);

    for (i, message) in messages.iter().enumerate() {
        let base = i * 4;
        placeholders.push(format!(
            "(${}, ${}, ${}, ${})",
            base + 1,
            base + 2,
            base + 3,
            base + 4
        ));
        params.push(&conversation_id);
        params.push(&roles[i]);
        params.push(&message.model_id);
        params.push(&message.content);
    }

    let sql = format!(
        "INSERT INTO messages (conversation_id, role, model_id, content)
         VALUES {}
         RETURNING message_id, conversation_id, role, model_id, content, created_at",
        placeholders.join(", ")
    );

    let rows = tx.query(sql.as_str(), &params).await?;
    let mut records = rows.iter().map(parse_message_row).collect::<Result<Vec<_>>>()?;
    records.sort_by_key(|record| record.message_id);

    tx.execute(
        "UPDATE conversations SET updated_at = now() WHERE conversation_id = $1",
        &[&conversation_id],
    )
    .await?;

    Ok(records)
}

/// Retrieve the active model and ordered role/content history of a chat
///
/// Returns None if the chat doesn't exist or belongs to another user. A chat
/// without messages yields an empty history.
pub async fn select_chat_context(
    pool: &Pool,
    user_id: Uuid,
    chat_id: Uuid,
) -> Result<Option<ChatContext>> {
    let conn = pool.get().await?;

    let Some(chat) = conn
        .query_opt(
            "SELECT current_model_id FROM conversations
             WHERE conversation_id = $1 AND user_id = $2",
            &[&chat_id, &user_id],
        )
        .await?
    else {
        return Ok(None);
    };

    let rows = conn
        .query(
            "SELECT role, content FROM messages
             WHERE conversation_id = $1
             ORDER BY created_at, message_id",
            &[&chat_id],
        )
        .await?;

    let turns = rows
        .iter()
        .map(|row| {
            let role: String = row.get("role");
            Ok(ChatTurn {
                role: parse_role(&role)?,
                content: row.get("content"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(ChatContext {
        current_model_id: chat.get("current_model_id"),
        turns,
    }))
}

/// Retrieve a chat with all of its messages
pub async fn select_chat(
    pool: &Pool,
    user_id: Uuid,
    chat_id: Uuid,
) -> Result<Option<ChatWithMessages>> {
    let conn = pool.get().await?;

    let Some(chat) = conn
        .query_opt(
            "SELECT conversation_id, current_model_id, title, workspace_id, folder_id,
                    created_at, updated_at
             FROM conversations
             WHERE conversation_id = $1 AND user_id = $2",
            &[&chat_id, &user_id],
        )
        .await?
    else {
        return Ok(None);
    };

    let rows = conn
        .query(
            "SELECT message_id, conversation_id, role, model_id, content, created_at
             FROM messages
             WHERE conversation_id = $1
             ORDER BY created_at, message_id",
            &[&chat_id],
        )
        .await?;

    let messages = rows.iter().map(parse_message_row).collect::<Result<Vec<_>>>()?;

    Ok(Some(parse_chat_row(&chat, messages)))
}

/// Page through the titles of a user's chats in the global space
///
/// Chats placed in a workspace or folder are excluded. Most recently updated
/// chats come first. `total_count` counts every global chat, not just the page.
pub async fn select_user_chat_titles(
    pool: &Pool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<ChatTitlesPage> {
    let conn = pool.get().await?;

    let total_count: i64 = conn
        .query_one(
            "SELECT COUNT(*) FROM conversations
             WHERE user_id = $1 AND workspace_id IS NULL AND folder_id IS NULL",
            &[&user_id],
        )
        .await?
        .get(0);

    let rows = conn
        .query(
            "SELECT conversation_id, title FROM conversations
             WHERE user_id = $1 AND workspace_id IS NULL AND folder_id IS NULL
             ORDER BY updated_at DESC, conversation_id
             LIMIT $2 OFFSET $3",
            &[&user_id, &limit, &offset],
        )
        .await?;

    let conversations = rows
        .iter()
        .map(|row| ChatTitle {
            conversation_id: row.get("conversation_id"),
            title: row.get("title"),
        })
        .collect();

    Ok(ChatTitlesPage {
        total_count,
        conversations,
    })
}

/// Create a conversation and its opening messages atomically
pub async fn insert_chat_with_messages(
    pool: &Pool,
    chat: NewChat,
    messages: &[NewMessage],
) -> Result<ChatWithMessages> {
    let mut conn = pool.get().await?;
    let tx = conn.transaction().await?;

    let row = tx
        .query_one(
            "INSERT INTO conversations (user_id, current_model_id, title, workspace_id, folder_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING conversation_id, current_model_id, title, workspace_id, folder_id,
                       created_at, updated_at",
            &[
                &chat.user_id,
                &chat.model_id,
                &chat.title,
                &chat.workspace_id,
                &chat.folder_id,
            ],
        )
        .await?;

    let conversation_id: Uuid = row.get("conversation_id");
    let records = insert_messages_in(&tx, conversation_id, messages).await?;

    tx.commit().await?;

    info!(%conversation_id, user_id = %chat.user_id, "Created chat");
    Ok(parse_chat_row(&row, records))
}

/// Append messages to an existing chat owned by `user_id`
///
/// When `switch_model` is set the chat's current model changes in the same
/// transaction, so the messages and the switch are stored together or not at all.
pub async fn insert_chat_messages(
    pool: &Pool,
    user_id: Uuid,
    conversation_id: Uuid,
    messages: &[NewMessage],
    switch_model: Option<Uuid>,
) -> Result<Vec<MessageRecord>> {
    let mut conn = pool.get().await?;
    let tx = conn.transaction().await?;

    let owned = tx
        .query_opt(
            "SELECT 1 FROM conversations
             WHERE conversation_id = $1 AND user_id = $2
             FOR UPDATE",
            &[&conversation_id, &user_id],
        )
        .await?;
    if owned.is_none() {
        return Err(Error::NotFoundError("Chat not found".to_string()));
    }

    let records = insert_messages_in(&tx, conversation_id, messages).await?;

    if let Some(model_id) = switch_model {
        tx.execute(
            "UPDATE conversations SET current_model_id = $1 WHERE conversation_id = $2",
            &[&model_id, &conversation_id],
        )
        .await?;
    }
    tx.commit().await?;

    debug!(%conversation_id, count = records.len(), ?switch_model, "Inserted chat messages");
    Ok(records)
}

/// Update the title of a chat
pub async fn update_chat_title(
    pool: &Pool,
    user_id: Uuid,
    chat_id: Uuid,
    new_title: &str,
) -> Result<Option<UpdatedTitle>> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt(
            "UPDATE conversations
             SET title = $1, updated_at = now()
             WHERE conversation_id = $2 AND user_id = $3
             RETURNING conversation_id, title",
            &[&new_title, &chat_id, &user_id],
        )
        .await?;

    Ok(row.map(|row| UpdatedTitle {
        conversation_id: row.get("conversation_id"),
        title: row.get("title"),
    }))
}

/// Point a chat at a different model for subsequent replies
pub async fn update_conversation_model(
    pool: &Pool,
    user_id: Uuid,
    chat_id: Uuid,
    model_id: Uuid,
) -> Result<Option<UpdatedModel>> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt(
            "UPDATE conversations
             SET current_model_id = $1
             WHERE conversation_id = $2 AND user_id = $3
             RETURNING conversation_id, current_model_id",
            &[&model_id, &chat_id, &user_id],
        )
        .await?;

    Ok(row.map(|row| UpdatedModel {
        conversation_id: row.get("conversation_id"),
        current_model_id: row.get("current_model_id"),
    }))
}

/// Delete a chat and its messages; returns whether a row was deleted
pub async fn delete_chat(pool: &Pool, user_id: Uuid, chat_id: Uuid) -> Result<bool> {
    let conn = pool.get().await?;

    let deleted = conn
        .execute(
            "DELETE FROM conversations WHERE conversation_id = $1 AND user_id = $2",
            &[&chat_id, &user_id],
        )
        .await?;

    if deleted > 0 {
        info!(%chat_id, "Deleted chat");
    }
    Ok(deleted > 0)
}
