pub mod catalog;
pub mod chats;
pub mod folders;
pub mod movements;
pub mod users;
pub mod workspaces;

pub use catalog::{get_model_name_and_service, list_models};
pub use chats::{
    delete_chat, insert_chat_messages, insert_chat_with_messages, select_chat,
    select_chat_context, select_user_chat_titles, update_chat_title, update_conversation_model,
};
pub use folders::{create_folder, delete_folder, get_user_global_folders};
pub use movements::{get_current_location, location_exists, move_item};
pub use users::{create_user, get_or_create_user, get_user_by_email};
pub use workspaces::{
    count_user_workspaces, create_workspace, delete_workspace, get_user_workspaces,
    get_workspace_chats, get_workspace_folders, MAX_WORKSPACES_PER_USER,
};
