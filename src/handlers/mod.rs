// Handlers module

pub mod auth;
pub mod chats;
pub mod folders;
pub mod models;
pub mod movements;
pub mod quiz;
pub mod root;
pub mod workspaces;

use bytes::Bytes;

use crate::error::ApiError;
use crate::models::DeleteRequest;

pub use auth::{auth_callback_handler, google_login_handler};
pub use chats::{
    create_chat_handler, delete_chat_handler, get_chat_handler, get_chat_titles_handler,
    send_message_handler, stream_message_handler, update_chat_model_handler,
    update_chat_title_handler,
};
pub use folders::{create_folder_handler, delete_folder_handler, get_global_folders_handler};
pub use models::list_models_handler;
pub use movements::move_item_handler;
pub use quiz::generate_quiz_handler;
pub use root::root_handler;
pub use workspaces::{
    create_workspace_handler, delete_workspace_handler, get_user_workspaces_handler,
    get_workspace_chats_handler, get_workspace_folders_handler,
};

/// DELETE bodies are optional; no body means the default mode
pub(crate) fn parse_delete_request(body: &Bytes) -> Result<DeleteRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DeleteRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeletionMode;

    #[test]
    fn test_parse_delete_request() {
        assert_eq!(
            parse_delete_request(&Bytes::new()).unwrap().mode,
            DeletionMode::Archive
        );
        assert_eq!(
            parse_delete_request(&Bytes::from_static(br#"{"mode":"permanent"}"#))
                .unwrap()
                .mode,
            DeletionMode::Permanent
        );
        assert!(matches!(
            parse_delete_request(&Bytes::from_static(br#"{"mode":"later"}"#)),
            Err(ApiError::Validation(_))
        ));
    }
}
