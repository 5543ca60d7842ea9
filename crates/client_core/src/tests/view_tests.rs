use super::*;
use crate::{buffer::SyntaxMode, session::OpenFileSnapshot};
use shared::{
    domain::{ConfigKind, ConfigPair, ProjectId},
    protocol::HostUser,
};

fn demo_project() -> Project {
    Project {
        id: ProjectId::from("p1"),
        name: "demo".to_string(),
    }
}

fn loaded_snapshot() -> WorkspaceSnapshot {
    WorkspaceSnapshot {
        selected_project: Some(demo_project()),
        file_listing: vec!["hello.py".to_string(), "README.md".to_string()],
        open_file: Some(OpenFileSnapshot {
            path: "hello.py".to_string(),
            original_content: "print(1)".to_string(),
            buffer_content: "print(1)".to_string(),
            mode: SyntaxMode::Python,
            dirty: false,
        }),
        config_pair: Some(ConfigPair {
            manifest: ConfigKind::Manifest.default_document(),
            env: ConfigKind::Env.default_document(),
        }),
        export_url: Some("http://store.test/api/projects/p1/export.zip".to_string()),
        in_flight: Vec::new(),
    }
}

#[test]
fn rendering_is_idempotent() {
    let snapshot = loaded_snapshot();
    let projects = vec![demo_project()];
    let mut sync = ViewSynchronizer::default();
    sync.switch_tab(Tab::Editor);
    let first = sync.sync(&snapshot, &projects, None);
    let second = sync.sync(&snapshot, &projects, None);
    assert_eq!(first, second);
    assert_eq!(second.visible_pane, Tab::Editor);
}

#[test]
fn project_tabs_fall_back_to_projects_pane_without_selection() {
    let snapshot = WorkspaceSnapshot::default();
    for tab in [Tab::Import, Tab::Upload, Tab::Editor, Tab::Config, Tab::Export] {
        let view = render(&ViewInputs {
            snapshot: &snapshot,
            projects: &[],
            active_tab: tab,
            identity: None,
        });
        assert_eq!(view.visible_pane, Tab::Projects);
    }
    let view = render(&ViewInputs {
        snapshot: &snapshot,
        projects: &[],
        active_tab: Tab::Chat,
        identity: None,
    });
    assert_eq!(view.visible_pane, Tab::Chat);
    assert!(view
        .tabs
        .iter()
        .all(|state| state.enabled == !state.tab.requires_project()));
    assert_eq!(view.status_text, "Select or create a project to get started.");
    assert_eq!(view.export_link, None);
    assert_eq!(view.export_summary, "Select a project to enable export");
}

#[test]
fn selectors_mark_current_project_and_open_file() {
    let snapshot = loaded_snapshot();
    let other = Project {
        id: ProjectId::from("p2"),
        name: "other".to_string(),
    };
    let projects = vec![demo_project(), other];
    let view = render(&ViewInputs {
        snapshot: &snapshot,
        projects: &projects,
        active_tab: Tab::Editor,
        identity: None,
    });

    let selected: Vec<_> = view
        .project_options
        .iter()
        .filter(|option| option.selected)
        .map(|option| option.value.as_str())
        .collect();
    assert_eq!(selected, vec!["p1"]);
    assert_eq!(view.project_options.len(), 3);
    assert_eq!(view.project_options[1].label, "demo (p1)");

    let files: Vec<_> = view
        .file_options
        .iter()
        .map(|option| (option.value.as_str(), option.selected))
        .collect();
    assert_eq!(files, vec![("hello.py", true), ("README.md", false)]);
    assert_eq!(view.editor_hint, "hello.py (python)");
}

#[test]
fn selected_project_missing_from_listing_is_still_shown() {
    let snapshot = loaded_snapshot();
    let view = render(&ViewInputs {
        snapshot: &snapshot,
        projects: &[],
        active_tab: Tab::Projects,
        identity: None,
    });
    assert_eq!(view.project_options.len(), 2);
    assert!(view.project_options[1].selected);
}

#[test]
fn export_and_status_describe_the_project() {
    let view = render(&ViewInputs {
        snapshot: &loaded_snapshot(),
        projects: &[],
        active_tab: Tab::Export,
        identity: None,
    });
    assert_eq!(view.visible_pane, Tab::Export);
    assert_eq!(
        view.export_link.as_deref(),
        Some("http://store.test/api/projects/p1/export.zip")
    );
    assert_eq!(view.export_summary, "Download demo (2 files) as a ZIP archive");
    assert_eq!(view.status_text, "demo: 2 files");
    let config = view.config.expect("config view");
    assert_eq!(config.manifest, "");
    assert!(config.env.contains("EXAMPLE_KEY"));
}

#[test]
fn in_flight_operations_drive_status_and_disabled_controls() {
    let mut snapshot = loaded_snapshot();
    snapshot.in_flight = vec![Operation::Import];
    let view = render(&ViewInputs {
        snapshot: &snapshot,
        projects: &[],
        active_tab: Tab::Import,
        identity: None,
    });
    assert_eq!(view.status_text, "Importing…");
    assert_eq!(view.disabled_controls, vec![(Operation::Import, "Importing…")]);
}

#[test]
fn editor_hint_tracks_dirty_and_blank_files() {
    let mut snapshot = loaded_snapshot();
    if let Some(open) = snapshot.open_file.as_mut() {
        open.buffer_content = "print(2)".to_string();
        open.dirty = true;
    }
    let view = render(&ViewInputs {
        snapshot: &snapshot,
        projects: &[],
        active_tab: Tab::Editor,
        identity: None,
    });
    assert_eq!(view.editor_hint, "hello.py (python), unsaved changes");

    if let Some(open) = snapshot.open_file.as_mut() {
        open.path.clear();
    }
    let view = render(&ViewInputs {
        snapshot: &snapshot,
        projects: &[],
        active_tab: Tab::Editor,
        identity: None,
    });
    assert_eq!(view.editor_hint, "New file (unsaved)");
}

#[test]
fn identity_panel_reflects_host_presence() {
    let snapshot = WorkspaceSnapshot::default();
    let standalone = render(&ViewInputs {
        snapshot: &snapshot,
        projects: &[],
        active_tab: Tab::Chat,
        identity: None,
    });
    assert_eq!(standalone.identity.env_badge, "Standalone");
    assert_eq!(standalone.identity.user_id, "—");

    let identity = HostIdentity {
        user: Some(HostUser {
            id: Some(99),
            first_name: Some("Grace".to_string()),
            last_name: Some("Hopper".to_string()),
            username: None,
        }),
        color_scheme: Some("dark".to_string()),
        platform: Some("android".to_string()),
    };
    let hosted = render(&ViewInputs {
        snapshot: &snapshot,
        projects: &[],
        active_tab: Tab::Chat,
        identity: Some(&identity),
    });
    assert_eq!(hosted.identity.display_name, "Grace Hopper");
    assert_eq!(hosted.identity.user_id, "99");
    assert_eq!(hosted.identity.color_scheme, "dark");
    assert_eq!(hosted.identity.env_badge, "Host app");
}

#[test]
fn parses_tab_names() {
    assert_eq!("editor".parse::<Tab>(), Ok(Tab::Editor));
    assert_eq!(" CONFIG ".parse::<Tab>(), Ok(Tab::Config));
    assert!("settings".parse::<Tab>().is_err());
}
