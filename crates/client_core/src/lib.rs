use async_trait::async_trait;
use shared::{
    domain::{ConfigKind, FileDocument, Project, ProjectId},
    protocol::{PublishRequest, PublishResponse},
};
use tokio::sync::broadcast;

pub mod bridge;
pub mod buffer;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod session;
pub mod view;

pub use bridge::{BridgeDelivery, BridgeEmitter, HapticKind, HostBridge, MissingHostBridge};
pub use buffer::{syntax_mode_for_path, EditorWidget, SyntaxMode, TextBufferWidget};
pub use controller::{CommandOutcome, UiError, UserCommand, WorkspaceController};
pub use error::SessionError;
pub use gateway::{GatewayError, RemoteGateway};
pub use session::{Operation, ProjectSession, UploadFile, WorkspaceSnapshot};
pub use view::{Tab, ViewState, ViewSynchronizer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ProjectsListed { count: usize },
    ProjectCreated { project: Project },
    ProjectSelected { project_id: ProjectId, file_count: usize },
    ProjectCleared,
    FileOpened { path: String, mode: SyntaxMode },
    FileSaved { path: String },
    ConfigDefaulted { kind: ConfigKind },
    Imported { project_id: ProjectId },
    Uploaded { path: String },
    Published { project_id: ProjectId, html_url: String },
}

#[async_trait]
pub trait WorkspaceHandle: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>, SessionError>;
    /// Does not select the created project.
    async fn create_project(&self, name: &str) -> Result<Project, SessionError>;
    /// `None` (or a blank id) clears the selection without a network call.
    async fn select_project(&self, id: Option<&ProjectId>) -> Result<(), SessionError>;
    async fn import_from_remote_repo(&self, repo_url: &str) -> Result<(), SessionError>;
    async fn upload_file(
        &self,
        file: UploadFile,
        destination: Option<&str>,
    ) -> Result<(), SessionError>;
    async fn load_file(&self, path: &str) -> Result<FileDocument, SessionError>;
    async fn create_blank_file(&self);
    async fn save_file(&self, path: &str, content: &str) -> Result<(), SessionError>;
    /// Saves the live buffer under `path`, or under the open path.
    async fn save_open_file(&self, path: Option<&str>) -> Result<(), SessionError>;
    async fn save_config(&self, kind: ConfigKind, content: &str) -> Result<(), SessionError>;
    async fn reload(&self) -> Result<(), SessionError>;
    async fn publish(&self, request: PublishRequest) -> Result<PublishResponse, SessionError>;
    async fn edit_buffer(&self, text: &str);
    async fn read_buffer(&self) -> String;
    async fn is_dirty(&self) -> bool;
    async fn snapshot(&self) -> WorkspaceSnapshot;
    fn export_url(&self, id: &ProjectId) -> Result<String, SessionError>;
    fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent>;
}

#[cfg(test)]
#[path = "tests/remote_store.rs"]
mod remote_store;
