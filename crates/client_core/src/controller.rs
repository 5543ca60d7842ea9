use std::sync::Arc;

use shared::{
    domain::{ConfigKind, Project, ProjectId},
    protocol::PublishRequest,
};
use tracing::{debug, warn};

use crate::{
    bridge::{
        project_info_event, project_published_event, BridgeDelivery, BridgeEmitter, HapticKind,
    },
    error::SessionError,
    session::UploadFile,
    view::{Tab, ViewState, ViewSynchronizer},
    WorkspaceHandle,
};

#[derive(Debug, Clone)]
pub enum UserCommand {
    ListProjects,
    CreateProject {
        name: String,
    },
    SelectProject {
        id: Option<ProjectId>,
    },
    ImportRepo {
        repo_url: String,
    },
    Upload {
        file: UploadFile,
        destination: Option<String>,
    },
    OpenFile {
        path: String,
    },
    NewFile,
    EditBuffer {
        text: String,
    },
    SaveFile {
        path: Option<String>,
    },
    SaveConfig {
        kind: ConfigKind,
        content: String,
    },
    Reload,
    Publish {
        repo_name: String,
        description: String,
        private: bool,
    },
    SendMessage {
        source: String,
        text: String,
    },
    ShareProjectInfo,
    Haptic,
    SwitchTab(Tab),
}

impl UserCommand {
    pub fn name(&self) -> &'static str {
        match self {
            UserCommand::ListProjects => "list_projects",
            UserCommand::CreateProject { .. } => "create_project",
            UserCommand::SelectProject { .. } => "select_project",
            UserCommand::ImportRepo { .. } => "import_repo",
            UserCommand::Upload { .. } => "upload",
            UserCommand::OpenFile { .. } => "open_file",
            UserCommand::NewFile => "new_file",
            UserCommand::EditBuffer { .. } => "edit_buffer",
            UserCommand::SaveFile { .. } => "save_file",
            UserCommand::SaveConfig { .. } => "save_config",
            UserCommand::Reload => "reload",
            UserCommand::Publish { .. } => "publish",
            UserCommand::SendMessage { .. } => "send_message",
            UserCommand::ShareProjectInfo => "share_project_info",
            UserCommand::Haptic => "haptic",
            UserCommand::SwitchTab(_) => "switch_tab",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Remote,
    Transport,
    Busy,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    command: &'static str,
    message: String,
}

impl UiError {
    pub fn from_session(command: &'static str, err: &SessionError) -> Self {
        let category = match err {
            SessionError::Validation(_) | SessionError::NoProjectSelected => {
                UiErrorCategory::Validation
            }
            SessionError::Busy(_) => UiErrorCategory::Busy,
            SessionError::Remote { .. } => UiErrorCategory::Remote,
            SessionError::Transport(_) | SessionError::Decode(_) => UiErrorCategory::Transport,
        };
        let message = match err {
            SessionError::NoProjectSelected => "Select a project first.".to_string(),
            SessionError::Remote { status, message } => format!("Server error ({status}): {message}"),
            other => other.to_string(),
        };
        Self {
            category,
            command,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn command(&self) -> &'static str {
        self.command
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub view: ViewState,
    pub notice: Option<String>,
    pub alert: Option<UiError>,
    pub bridge: Option<BridgeDelivery>,
}

pub struct WorkspaceController {
    session: Arc<dyn WorkspaceHandle>,
    view: ViewSynchronizer,
    bridge: BridgeEmitter,
    projects: Vec<Project>,
}

impl WorkspaceController {
    pub fn new(session: Arc<dyn WorkspaceHandle>, bridge: BridgeEmitter) -> Self {
        Self {
            session,
            view: ViewSynchronizer::default(),
            bridge,
            projects: Vec::new(),
        }
    }

    pub async fn render(&self) -> ViewState {
        let snapshot = self.session.snapshot().await;
        let identity = self.bridge.identity();
        self.view
            .sync(&snapshot, &self.projects, identity.as_ref())
    }

    pub async fn dispatch(&mut self, command: UserCommand) -> CommandOutcome {
        let name = command.name();
        debug!(command = name, "controller: dispatch");
        let mut bridge = None;

        let result = self.run(command, &mut bridge).await;
        let (notice, alert) = match result {
            Ok(notice) => (notice, None),
            Err(err) => {
                warn!(command = name, error = %err, "controller: command failed");
                (None, Some(UiError::from_session(name, &err)))
            }
        };

        CommandOutcome {
            view: self.render().await,
            notice,
            alert,
            bridge,
        }
    }

    async fn run(
        &mut self,
        command: UserCommand,
        bridge: &mut Option<BridgeDelivery>,
    ) -> Result<Option<String>, SessionError> {
        match command {
            UserCommand::ListProjects => {
                self.projects = self.session.list_projects().await?;
                Ok(None)
            }
            UserCommand::CreateProject { name } => {
                let project = self.session.create_project(&name).await?;
                match self.session.list_projects().await {
                    Ok(projects) => self.projects = projects,
                    Err(err) => {
                        warn!(error = %err, "controller: project list refresh failed");
                        if !self.projects.iter().any(|p| p.id == project.id) {
                            self.projects.push(project.clone());
                        }
                    }
                }
                Ok(Some(format!(
                    "Created project {} ({})",
                    project.name, project.id
                )))
            }
            UserCommand::SelectProject { id } => {
                self.session.select_project(id.as_ref()).await?;
                Ok(None)
            }
            UserCommand::ImportRepo { repo_url } => {
                self.session.import_from_remote_repo(&repo_url).await?;
                Ok(Some("Import complete".to_string()))
            }
            UserCommand::Upload { file, destination } => {
                let label = destination.clone().unwrap_or_else(|| file.file_name.clone());
                self.session.upload_file(file, destination.as_deref()).await?;
                Ok(Some(format!("Uploaded {label}")))
            }
            UserCommand::OpenFile { path } => {
                self.session.load_file(&path).await?;
                self.view.switch_tab(Tab::Editor);
                Ok(None)
            }
            UserCommand::NewFile => {
                self.session.create_blank_file().await;
                self.view.switch_tab(Tab::Editor);
                Ok(None)
            }
            UserCommand::EditBuffer { text } => {
                self.session.edit_buffer(&text).await;
                Ok(None)
            }
            UserCommand::SaveFile { path } => {
                self.session.save_open_file(path.as_deref()).await?;
                Ok(Some("Saved".to_string()))
            }
            UserCommand::SaveConfig { kind, content } => {
                self.session.save_config(kind, &content).await?;
                Ok(Some(format!("Saved {}", kind.path())))
            }
            UserCommand::Reload => {
                self.session.reload().await?;
                Ok(None)
            }
            UserCommand::Publish {
                repo_name,
                description,
                private,
            } => {
                let published = self
                    .session
                    .publish(PublishRequest {
                        repo_name,
                        description,
                        private,
                    })
                    .await?;
                let snapshot = self.session.snapshot().await;
                if let (Some(project), Some(export_url)) =
                    (snapshot.selected_project.as_ref(), snapshot.export_url.as_deref())
                {
                    let event = project_published_event(project, export_url, &published);
                    *bridge = Some(self.bridge.notify(&event));
                }
                Ok(Some(format!("Published to {}", published.html_url)))
            }
            UserCommand::SendMessage { source, text } => {
                let event = self.bridge.user_message(&source, &text);
                let delivery = self.bridge.notify(&event);
                let notice = delivery.describe();
                *bridge = Some(delivery);
                Ok(Some(notice))
            }
            UserCommand::ShareProjectInfo => {
                let snapshot = self.session.snapshot().await;
                let project = snapshot
                    .selected_project
                    .as_ref()
                    .ok_or(SessionError::NoProjectSelected)?;
                let export_url = self.session.export_url(&project.id)?;
                let event = project_info_event(project, &export_url, snapshot.file_listing.len());
                let delivery = self.bridge.notify(&event);
                let notice = delivery.describe();
                *bridge = Some(delivery);
                Ok(Some(notice))
            }
            UserCommand::Haptic => {
                let delivery = self.bridge.haptic(HapticKind::Impact);
                let notice = delivery.describe();
                *bridge = Some(delivery);
                Ok(Some(notice))
            }
            UserCommand::SwitchTab(tab) => {
                self.view.switch_tab(tab);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
