use std::{
    collections::HashSet,
    sync::{Mutex as StdMutex, MutexGuard as StdMutexGuard},
};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use shared::{
    domain::{ConfigKind, ConfigPair, FileDocument, Project, ProjectId},
    protocol::{
        CreateProjectRequest, FileListingResponse, ImportRepoRequest, PublishRequest,
        PublishResponse,
    },
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};
use url::Url;

use crate::{
    buffer::{syntax_mode_for_path, DocumentBuffer, EditorWidget, SyntaxMode},
    error::SessionError,
    gateway::{api_path, GatewayError, GatewayRequest, RemoteGateway},
    SessionEvent, WorkspaceHandle,
};

pub const DEFAULT_PROJECT_NAME: &str = "My Project";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    CreateProject,
    Import,
    Upload,
    SaveFile,
    SaveConfig,
    Publish,
}

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Operation::CreateProject => "project creation",
            Operation::Import => "import",
            Operation::Upload => "upload",
            Operation::SaveFile => "save",
            Operation::SaveConfig => "config save",
            Operation::Publish => "publish",
        }
    }

    pub fn busy_label(self) -> &'static str {
        match self {
            Operation::CreateProject => "Creating…",
            Operation::Import => "Importing…",
            Operation::Upload => "Uploading…",
            Operation::SaveFile => "Saving…",
            Operation::SaveConfig => "Saving config…",
            Operation::Publish => "Publishing…",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFile {
    pub path: String,
    pub original_content: String,
}

#[derive(Debug, Clone, Default)]
struct WorkspaceSession {
    selected_project: Option<Project>,
    file_listing: Vec<String>,
    open_file: Option<OpenFile>,
    config_pair: Option<ConfigPair>,
    export_url: Option<String>,
}

impl WorkspaceSession {
    fn selected_id(&self) -> Option<&ProjectId> {
        self.selected_project.as_ref().map(|project| &project.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFileSnapshot {
    pub path: String,
    pub original_content: String,
    pub buffer_content: String,
    pub mode: SyntaxMode,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkspaceSnapshot {
    pub selected_project: Option<Project>,
    pub file_listing: Vec<String>,
    pub open_file: Option<OpenFileSnapshot>,
    pub config_pair: Option<ConfigPair>,
    pub export_url: Option<String>,
    pub in_flight: Vec<Operation>,
}

impl WorkspaceSnapshot {
    pub fn selected_project_id(&self) -> Option<&ProjectId> {
        self.selected_project.as_ref().map(|project| &project.id)
    }
}

#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

struct SessionState<W: EditorWidget> {
    workspace: WorkspaceSession,
    buffer: DocumentBuffer<W>,
}

struct InFlightGuard<'a> {
    set: &'a StdMutex<HashSet<Operation>>,
    operation: Operation,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        lock_in_flight(self.set).remove(&self.operation);
    }
}

fn lock_in_flight(set: &StdMutex<HashSet<Operation>>) -> StdMutexGuard<'_, HashSet<Operation>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn require_non_blank(value: &str, what: &str) -> Result<(), SessionError> {
    if value.trim().is_empty() {
        return Err(SessionError::validation(format!("{what} is required")));
    }
    Ok(())
}

pub struct ProjectSession<W: EditorWidget + 'static> {
    gateway: RemoteGateway,
    public_base: Option<Url>,
    inner: Mutex<SessionState<W>>,
    in_flight: StdMutex<HashSet<Operation>>,
    events: broadcast::Sender<SessionEvent>,
}

impl<W: EditorWidget + 'static> ProjectSession<W> {
    pub fn new(gateway: RemoteGateway, widget: W) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            gateway,
            public_base: None,
            inner: Mutex::new(SessionState {
                workspace: WorkspaceSession::default(),
                buffer: DocumentBuffer::new(widget),
            }),
            in_flight: StdMutex::new(HashSet::new()),
            events,
        }
    }

    /// Base used for export urls handed to other parties, when it differs
    /// from the address the gateway talks to.
    pub fn with_public_base(mut self, public_url: &str) -> Result<Self, SessionError> {
        let trimmed = public_url.trim().trim_end_matches('/');
        let url = Url::parse(&format!("{trimmed}/"))
            .map_err(|e| SessionError::validation(format!("invalid public url: {e}")))?;
        self.public_base = Some(url);
        Ok(self)
    }

    fn begin(&self, operation: Operation) -> Result<InFlightGuard<'_>, SessionError> {
        let mut set = lock_in_flight(&self.in_flight);
        if !set.insert(operation) {
            return Err(SessionError::Busy(operation));
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            operation,
        })
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    async fn selected_id(&self) -> Result<ProjectId, SessionError> {
        self.inner
            .lock()
            .await
            .workspace
            .selected_id()
            .cloned()
            .ok_or(SessionError::NoProjectSelected)
    }

    fn project_path(id: &ProjectId, tail: &str) -> String {
        api_path(&["api", "projects", id.as_str(), tail])
    }

    async fn load_project(&self, id: &ProjectId) -> Result<(), SessionError> {
        let listing: FileListingResponse = self
            .gateway
            .call_json(GatewayRequest::get(Self::project_path(id, "files")))
            .await?;
        let export_url = self.export_url(id)?;
        let file_count = listing.files.len();

        {
            let mut guard = self.inner.lock().await;
            let switching = guard.workspace.selected_id() != Some(id);
            let state = &mut *guard;
            if switching {
                state.workspace.open_file = None;
                state.workspace.config_pair = None;
                state.buffer.clear();
            }
            state.workspace.selected_project = Some(Project {
                id: id.clone(),
                name: listing.project.name,
            });
            state.workspace.file_listing = listing.files;
            state.workspace.export_url = Some(export_url);
        }

        let (manifest, env) = futures::join!(
            self.fetch_config(id, ConfigKind::Manifest),
            self.fetch_config(id, ConfigKind::Env)
        );

        {
            let mut guard = self.inner.lock().await;
            if guard.workspace.selected_id() == Some(id) {
                guard.workspace.config_pair = Some(ConfigPair { manifest, env });
            } else {
                warn!(
                    project_id = %id,
                    "session: selection changed while loading config; discarding"
                );
            }
        }

        info!(project_id = %id, files = file_count, "session: project loaded");
        self.emit(SessionEvent::ProjectSelected {
            project_id: id.clone(),
            file_count,
        });
        Ok(())
    }

    async fn fetch_config(&self, id: &ProjectId, kind: ConfigKind) -> FileDocument {
        let request = GatewayRequest::get(Self::project_path(id, "file")).query("path", kind.path());
        match self.gateway.call_json::<FileDocument>(request).await {
            Ok(document) => document,
            Err(err) => {
                if err.is_not_found() {
                    info!(project_id = %id, path = kind.path(), "session: config not created yet");
                } else {
                    warn!(
                        project_id = %id,
                        path = kind.path(),
                        error = %err,
                        "session: config fetch failed; using default"
                    );
                }
                self.emit(SessionEvent::ConfigDefaulted { kind });
                kind.default_document()
            }
        }
    }

    /// A blank open file is adopted by the write only when `adopt_blank` is
    /// set, which is the editor saving its own buffer.
    async fn write_file(
        &self,
        id: &ProjectId,
        path: &str,
        content: &str,
        adopt_blank: bool,
    ) -> Result<(), SessionError> {
        let request = GatewayRequest::post(Self::project_path(id, "file"))
            .json(&FileDocument::new(path, content))?;
        self.gateway.call(request).await?;

        {
            let mut guard = self.inner.lock().await;
            let state = &mut *guard;
            if state.workspace.selected_id() == Some(id) {
                let rebase = state
                    .workspace
                    .open_file
                    .as_ref()
                    .map(|open| open.path == path || (adopt_blank && open.path.is_empty()))
                    .unwrap_or(false);
                if rebase {
                    state.workspace.open_file = Some(OpenFile {
                        path: path.to_string(),
                        original_content: content.to_string(),
                    });
                    state.buffer.rebase(path, content);
                }
            }
        }

        info!(project_id = %id, path, bytes = content.len(), "session: file saved");
        self.emit(SessionEvent::FileSaved {
            path: path.to_string(),
        });
        self.load_project(id).await
    }

    async fn save_under(
        &self,
        path: &str,
        content: &str,
        adopt_blank: bool,
    ) -> Result<(), SessionError> {
        let id = self.selected_id().await?;
        require_non_blank(path, "file path")?;
        let _guard = self.begin(Operation::SaveFile)?;
        self.write_file(&id, path.trim(), content, adopt_blank).await
    }
}

#[async_trait]
impl<W: EditorWidget + 'static> WorkspaceHandle for ProjectSession<W> {
    async fn list_projects(&self) -> Result<Vec<Project>, SessionError> {
        let projects: Vec<Project> = self
            .gateway
            .call_json(GatewayRequest::get(api_path(&["api", "projects"])))
            .await?;
        self.emit(SessionEvent::ProjectsListed {
            count: projects.len(),
        });
        Ok(projects)
    }

    async fn create_project(&self, name: &str) -> Result<Project, SessionError> {
        let _guard = self.begin(Operation::CreateProject)?;
        let name = match name.trim() {
            "" => DEFAULT_PROJECT_NAME.to_string(),
            trimmed => trimmed.to_string(),
        };
        let request =
            GatewayRequest::post(api_path(&["api", "projects"])).json(&CreateProjectRequest { name })?;
        let project: Project = self.gateway.call_json(request).await?;
        info!(project_id = %project.id, name = %project.name, "session: project created");
        self.emit(SessionEvent::ProjectCreated {
            project: project.clone(),
        });
        Ok(project)
    }

    async fn select_project(&self, id: Option<&ProjectId>) -> Result<(), SessionError> {
        let Some(id) = id.filter(|id| !id.as_str().trim().is_empty()) else {
            let mut guard = self.inner.lock().await;
            guard.workspace = WorkspaceSession::default();
            guard.buffer.clear();
            drop(guard);
            info!("session: selection cleared");
            self.emit(SessionEvent::ProjectCleared);
            return Ok(());
        };
        self.load_project(id).await
    }

    async fn import_from_remote_repo(&self, repo_url: &str) -> Result<(), SessionError> {
        let id = self.selected_id().await?;
        require_non_blank(repo_url, "repository url")?;
        let _guard = self.begin(Operation::Import)?;

        let request = GatewayRequest::post(Self::project_path(&id, "import_github")).json(
            &ImportRepoRequest {
                repo_url: repo_url.trim().to_string(),
            },
        )?;
        self.gateway.call(request).await?;
        info!(project_id = %id, repo_url = repo_url.trim(), "session: repository imported");
        self.emit(SessionEvent::Imported {
            project_id: id.clone(),
        });
        self.load_project(&id).await
    }

    async fn upload_file(
        &self,
        file: UploadFile,
        destination: Option<&str>,
    ) -> Result<(), SessionError> {
        let id = self.selected_id().await?;
        require_non_blank(&file.file_name, "file name")?;
        let _guard = self.begin(Operation::Upload)?;

        let mut part = Part::bytes(file.bytes).file_name(file.file_name.clone());
        if let Some(mime_type) = &file.mime_type {
            part = part.mime_str(mime_type)?;
        }
        let mut form = Form::new().part("file", part);
        let destination = destination
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(str::to_string);
        if let Some(path) = &destination {
            form = form.text("path", path.clone());
        }

        let request = GatewayRequest::post(Self::project_path(&id, "upload")).multipart(form);
        self.gateway.call(request).await?;
        let path = destination.unwrap_or(file.file_name);
        info!(project_id = %id, path = %path, "session: file uploaded");
        self.emit(SessionEvent::Uploaded { path });
        self.load_project(&id).await
    }

    async fn load_file(&self, path: &str) -> Result<FileDocument, SessionError> {
        let id = self.selected_id().await?;
        require_non_blank(path, "file path")?;

        let request = GatewayRequest::get(Self::project_path(&id, "file")).query("path", path);
        let document: FileDocument = self.gateway.call_json(request).await?;

        {
            let mut guard = self.inner.lock().await;
            let state = &mut *guard;
            if state.workspace.selected_id() == Some(&id) {
                state.workspace.open_file = Some(OpenFile {
                    path: document.path.clone(),
                    original_content: document.content.clone(),
                });
                state.buffer.bind(&document);
            } else {
                warn!(
                    project_id = %id,
                    path,
                    "session: selection changed while loading file; not opening"
                );
                return Ok(document);
            }
        }

        self.emit(SessionEvent::FileOpened {
            path: document.path.clone(),
            mode: syntax_mode_for_path(&document.path),
        });
        Ok(document)
    }

    async fn create_blank_file(&self) {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        state.workspace.open_file = state.workspace.selected_project.as_ref().map(|_| OpenFile {
            path: String::new(),
            original_content: String::new(),
        });
        state.buffer.clear();
    }

    async fn save_file(&self, path: &str, content: &str) -> Result<(), SessionError> {
        self.save_under(path, content, false).await
    }

    async fn save_open_file(&self, path: Option<&str>) -> Result<(), SessionError> {
        let (open_path, content) = {
            let guard = self.inner.lock().await;
            let open_path = guard
                .workspace
                .open_file
                .as_ref()
                .map(|open| open.path.clone())
                .unwrap_or_default();
            (open_path, guard.buffer.read_buffer())
        };
        let path = path
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(str::to_string)
            .unwrap_or(open_path);
        if path.is_empty() {
            return Err(SessionError::validation(
                "choose a file name before saving a new file",
            ));
        }
        self.save_under(&path, &content, true).await
    }

    async fn save_config(&self, kind: ConfigKind, content: &str) -> Result<(), SessionError> {
        kind.validate(content)?;
        let id = self.selected_id().await?;
        let _guard = self.begin(Operation::SaveConfig)?;
        self.write_file(&id, kind.path(), content, false).await
    }

    async fn reload(&self) -> Result<(), SessionError> {
        let id = self.selected_id().await?;
        self.load_project(&id).await
    }

    async fn publish(&self, request: PublishRequest) -> Result<PublishResponse, SessionError> {
        let id = self.selected_id().await?;
        require_non_blank(&request.repo_name, "repository name")?;
        let _guard = self.begin(Operation::Publish)?;

        let request = GatewayRequest::post(Self::project_path(&id, "publish_github")).json(
            &PublishRequest {
                repo_name: request.repo_name.trim().to_string(),
                description: request.description,
                private: request.private,
            },
        )?;
        let response: PublishResponse = self.gateway.call_json(request).await?;
        info!(project_id = %id, repo = %response.repo, "session: project published");
        self.emit(SessionEvent::Published {
            project_id: id,
            html_url: response.html_url.clone(),
        });
        Ok(response)
    }

    async fn edit_buffer(&self, text: &str) {
        self.inner.lock().await.buffer.edit(text);
    }

    async fn read_buffer(&self) -> String {
        self.inner.lock().await.buffer.read_buffer()
    }

    async fn is_dirty(&self) -> bool {
        self.inner.lock().await.buffer.is_dirty()
    }

    async fn snapshot(&self) -> WorkspaceSnapshot {
        let guard = self.inner.lock().await;
        let open_file = guard.workspace.open_file.as_ref().map(|open| OpenFileSnapshot {
            path: open.path.clone(),
            original_content: open.original_content.clone(),
            buffer_content: guard.buffer.read_buffer(),
            mode: guard.buffer.mode(),
            dirty: guard.buffer.is_dirty(),
        });
        let mut in_flight: Vec<Operation> = lock_in_flight(&self.in_flight).iter().copied().collect();
        in_flight.sort();
        WorkspaceSnapshot {
            selected_project: guard.workspace.selected_project.clone(),
            file_listing: guard.workspace.file_listing.clone(),
            open_file,
            config_pair: guard.workspace.config_pair.clone(),
            export_url: guard.workspace.export_url.clone(),
            in_flight,
        }
    }

    fn export_url(&self, id: &ProjectId) -> Result<String, SessionError> {
        let path = Self::project_path(id, "export.zip");
        let url = match &self.public_base {
            Some(base) => base
                .join(path.trim_start_matches('/'))
                .map_err(|e| GatewayError::InvalidUrl(e.to_string()))?,
            None => self.gateway.endpoint_url(&path)?,
        };
        Ok(url.to_string())
    }

    fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
