// Request and response schemas shared by the handlers and the query layer

pub mod auth;
pub mod catalog;
pub mod chats;
pub mod folders;
pub mod movements;
pub mod quiz;
pub mod workspaces;

pub use auth::{CallbackQuery, TokenResponse};
pub use catalog::ModelInfo;
pub use chats::{
    ChatRole, ChatTitle, ChatTitlesPage, ChatWithMessages, CreateChatRequest,
    CreateMessageRequest, MessageRecord, TitlesQuery, UpdateModelRequest, UpdateTitleRequest,
    UpdatedModel, UpdatedTitle,
};
pub use folders::{CreateFolderRequest, FolderRecord};
pub use movements::{ItemType, Location, LocationType, MoveRequest, MoveResponse};
pub use quiz::{QuizRequest, QuizResponse};
pub use workspaces::{
    ChatSummary, CreateWorkspaceRequest, DeleteRequest, DeletionMode, FolderWithChats,
    UserWorkspacesResponse, WorkspaceChat, WorkspaceChats, WorkspaceFolders, WorkspaceRecord,
    WorkspaceSummary,
};
