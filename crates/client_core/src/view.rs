use shared::{domain::Project, protocol::HostIdentity};

use crate::session::{Operation, WorkspaceSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Projects,
    Import,
    Upload,
    Editor,
    Config,
    Export,
    Chat,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Projects,
        Tab::Import,
        Tab::Upload,
        Tab::Editor,
        Tab::Config,
        Tab::Export,
        Tab::Chat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Projects => "Projects",
            Tab::Import => "Import",
            Tab::Upload => "Upload",
            Tab::Editor => "Editor",
            Tab::Config => "Config",
            Tab::Export => "Export",
            Tab::Chat => "Chat",
        }
    }

    pub fn requires_project(self) -> bool {
        !matches!(self, Tab::Projects | Tab::Chat)
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Tab::ALL
            .into_iter()
            .find(|tab| tab.label().to_ascii_lowercase() == wanted)
            .ok_or_else(|| format!("unknown tab '{}'", s.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabState {
    pub tab: Tab,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityView {
    pub display_name: String,
    pub user_id: String,
    pub color_scheme: String,
    pub env_badge: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigView {
    pub manifest: String,
    pub env: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub visible_pane: Tab,
    pub tabs: Vec<TabState>,
    pub project_options: Vec<SelectOption>,
    pub file_options: Vec<SelectOption>,
    pub export_link: Option<String>,
    pub export_summary: String,
    pub status_text: String,
    pub editor_hint: String,
    pub config: Option<ConfigView>,
    pub disabled_controls: Vec<(Operation, &'static str)>,
    pub identity: IdentityView,
}

pub struct ViewInputs<'a> {
    pub snapshot: &'a WorkspaceSnapshot,
    pub projects: &'a [Project],
    pub active_tab: Tab,
    pub identity: Option<&'a HostIdentity>,
}

const PLACEHOLDER: &str = "—";

pub fn render(inputs: &ViewInputs<'_>) -> ViewState {
    let snapshot = inputs.snapshot;
    let project = snapshot.selected_project.as_ref();
    let has_project = project.is_some();

    let visible_pane = if inputs.active_tab.requires_project() && !has_project {
        Tab::Projects
    } else {
        inputs.active_tab
    };
    let tabs = Tab::ALL
        .into_iter()
        .map(|tab| TabState {
            tab,
            enabled: has_project || !tab.requires_project(),
        })
        .collect();

    ViewState {
        visible_pane,
        tabs,
        project_options: project_options(inputs.projects, project),
        file_options: file_options(snapshot),
        export_link: project.and(snapshot.export_url.clone()),
        export_summary: export_summary(snapshot),
        status_text: status_text(snapshot),
        editor_hint: editor_hint(snapshot),
        config: snapshot.config_pair.as_ref().map(|pair| ConfigView {
            manifest: pair.manifest.content.clone(),
            env: pair.env.content.clone(),
        }),
        disabled_controls: snapshot
            .in_flight
            .iter()
            .map(|operation| (*operation, operation.busy_label()))
            .collect(),
        identity: identity_view(inputs.identity),
    }
}

fn project_options(projects: &[Project], selected: Option<&Project>) -> Vec<SelectOption> {
    let mut options = vec![SelectOption {
        value: String::new(),
        label: "Select a project".to_string(),
        selected: selected.is_none(),
    }];
    options.extend(projects.iter().map(|project| SelectOption {
        value: project.id.to_string(),
        label: format!("{} ({})", project.name, project.id),
        selected: selected.map(|s| s.id == project.id).unwrap_or(false),
    }));
    // The listing may predate the selection; keep the selector truthful.
    if let Some(selected) = selected {
        if !projects.iter().any(|project| project.id == selected.id) {
            options.push(SelectOption {
                value: selected.id.to_string(),
                label: format!("{} ({})", selected.name, selected.id),
                selected: true,
            });
        }
    }
    options
}

fn file_options(snapshot: &WorkspaceSnapshot) -> Vec<SelectOption> {
    let open_path = snapshot.open_file.as_ref().map(|open| open.path.as_str());
    snapshot
        .file_listing
        .iter()
        .map(|path| SelectOption {
            value: path.clone(),
            label: path.clone(),
            selected: open_path == Some(path.as_str()),
        })
        .collect()
}

fn export_summary(snapshot: &WorkspaceSnapshot) -> String {
    match &snapshot.selected_project {
        Some(project) => format!(
            "Download {} ({} {}) as a ZIP archive",
            project.name,
            snapshot.file_listing.len(),
            plural(snapshot.file_listing.len(), "file", "files")
        ),
        None => "Select a project to enable export".to_string(),
    }
}

fn status_text(snapshot: &WorkspaceSnapshot) -> String {
    if let Some(operation) = snapshot.in_flight.first() {
        return operation.busy_label().to_string();
    }
    match &snapshot.selected_project {
        Some(project) => format!(
            "{}: {} {}",
            project.name,
            snapshot.file_listing.len(),
            plural(snapshot.file_listing.len(), "file", "files")
        ),
        None => "Select or create a project to get started.".to_string(),
    }
}

fn editor_hint(snapshot: &WorkspaceSnapshot) -> String {
    match &snapshot.open_file {
        None => "Open a file or create a new one.".to_string(),
        Some(open) if open.path.is_empty() => "New file (unsaved)".to_string(),
        Some(open) if open.dirty => format!("{} ({}), unsaved changes", open.path, open.mode.as_str()),
        Some(open) => format!("{} ({})", open.path, open.mode.as_str()),
    }
}

fn identity_view(identity: Option<&HostIdentity>) -> IdentityView {
    let Some(identity) = identity else {
        return IdentityView {
            display_name: "Open this inside the host app".to_string(),
            user_id: PLACEHOLDER.to_string(),
            color_scheme: PLACEHOLDER.to_string(),
            env_badge: "Standalone".to_string(),
        };
    };
    let user = identity.user.as_ref();
    IdentityView {
        display_name: user
            .and_then(|user| user.display_name())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        user_id: user
            .and_then(|user| user.id)
            .map(|id| id.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        color_scheme: identity
            .color_scheme
            .clone()
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        env_badge: "Host app".to_string(),
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

pub struct ViewSynchronizer {
    active_tab: Tab,
}

impl Default for ViewSynchronizer {
    fn default() -> Self {
        Self {
            active_tab: Tab::Projects,
        }
    }
}

impl ViewSynchronizer {
    pub fn switch_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn sync(
        &self,
        snapshot: &WorkspaceSnapshot,
        projects: &[Project],
        identity: Option<&HostIdentity>,
    ) -> ViewState {
        render(&ViewInputs {
            snapshot,
            projects,
            active_tab: self.active_tab,
            identity,
        })
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
