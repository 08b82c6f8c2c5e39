use std::convert::Infallible;

use serde_json::json;
use uuid::Uuid;
use warp::sse::Event;

use crate::models::MessageRecord;

/// A `chunk` event carrying one piece of the assistant's reply
pub fn create_chunk_event(conversation_id: Uuid, chunk: &str) -> Result<Event, Infallible> {
    let payload = json!({
        "conversation_id": conversation_id,
        "chunk": chunk
    });

    Ok(Event::default().event("chunk").data(payload.to_string()))
}

/// A `messages` event with the stored user and assistant messages
pub fn create_messages_event(messages: &[MessageRecord]) -> Result<Event, Infallible> {
    let payload = json!({ "messages": messages });

    Ok(Event::default().event("messages").data(payload.to_string()))
}

/// An `error` event; the stream ends after it
pub fn create_error_event(detail: &str) -> Result<Event, Infallible> {
    let payload = json!({ "detail": detail });

    Ok(Event::default().event("error").data(payload.to_string()))
}

/// Create a done SSE event to signal stream completion
pub fn create_done_event() -> Result<Event, Infallible> {
    let payload = json!({});

    Ok(Event::default().event("done").data(payload.to_string()))
}
