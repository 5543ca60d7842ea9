mod commands;
mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    bridge::{BridgeEmitter, HapticKind, HostBridge},
    controller::CommandOutcome,
    ProjectSession, RemoteGateway, TextBufferWidget, UploadFile, UserCommand, ViewState,
    WorkspaceController, WorkspaceHandle,
};
use shared::protocol::{HostIdentity, HostUser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    commands::{parse_command, ShellCommand, HELP},
    config::{load_settings, normalize_server_url, BridgeMode, DEFAULT_CONFIG_PATH},
};

#[derive(Parser, Debug)]
#[command(name = "workspace-shell", about = "Line-driven project workspace client")]
struct Args {
    /// Settings file (TOML, string values).
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    /// Base for export links handed to the host app.
    #[arg(long)]
    public_url: Option<String>,
    /// `none` or `stdout`.
    #[arg(long)]
    bridge: Option<BridgeMode>,
    #[arg(long)]
    log_filter: Option<String>,
}

/// Host bridge that writes each payload to stdout as one JSON line.
struct StdoutBridge {
    identity: HostIdentity,
}

impl StdoutBridge {
    fn from_env() -> Self {
        Self {
            identity: HostIdentity {
                user: std::env::var("USER").ok().map(|username| HostUser {
                    username: Some(username),
                    ..HostUser::default()
                }),
                color_scheme: None,
                platform: Some("shell".to_string()),
            },
        }
    }
}

impl HostBridge for StdoutBridge {
    fn identity(&self) -> Option<HostIdentity> {
        Some(self.identity.clone())
    }

    fn send_data(&self, data: &str) -> anyhow::Result<()> {
        println!("bridge> {data}");
        Ok(())
    }

    fn notify_haptic(&self, kind: HapticKind) -> anyhow::Result<()> {
        tracing::debug!(?kind, "shell: haptic");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    if let Some(v) = args.server_url {
        settings.server_url = normalize_server_url(&v);
    }
    if let Some(v) = args.public_url {
        settings.public_url = Some(v);
    }
    if let Some(v) = args.bridge {
        settings.bridge = v;
    }
    if let Some(v) = args.log_filter {
        settings.log_filter = v;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!(server_url = %settings.server_url, bridge = ?settings.bridge, "shell: starting");

    let gateway = RemoteGateway::new(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    let mut session = ProjectSession::new(gateway, TextBufferWidget::default());
    if let Some(public_url) = &settings.public_url {
        session = session.with_public_base(public_url)?;
    }
    let session: Arc<dyn WorkspaceHandle> = Arc::new(session);

    let mut events = session.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::debug!(?event, "shell: session event");
        }
    });

    let bridge = match settings.bridge {
        BridgeMode::Stdout => Some(Arc::new(StdoutBridge::from_env()) as Arc<dyn HostBridge>),
        BridgeMode::None => None,
    };
    let mut controller = WorkspaceController::new(session, BridgeEmitter::resolve(bridge));

    let outcome = controller.dispatch(UserCommand::ListProjects).await;
    print_outcome(&outcome);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line, &settings.default_project_name) {
            Ok(command) => command,
            Err(err) => {
                println!("! {err}");
                continue;
            }
        };
        match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::View => print_view(&controller.render().await),
            ShellCommand::Run(command) => print_outcome(&controller.dispatch(command).await),
            ShellCommand::Upload {
                local_path,
                destination,
            } => match read_upload(&local_path).await {
                Ok(file) => {
                    let outcome = controller
                        .dispatch(UserCommand::Upload { file, destination })
                        .await;
                    print_outcome(&outcome);
                }
                Err(err) => {
                    warn!(path = %local_path.display(), error = %err, "shell: upload read failed");
                    println!("! {err:#}");
                }
            },
        }
    }

    info!("shell: bye");
    Ok(())
}

async fn read_upload(local_path: &std::path::Path) -> Result<UploadFile> {
    let bytes = tokio::fs::read(local_path)
        .await
        .with_context(|| format!("failed to read '{}'", local_path.display()))?;
    let file_name = local_path
        .file_name()
        .and_then(|name| name.to_str())
        .context("upload path has no file name")?
        .to_string();
    Ok(UploadFile {
        file_name,
        bytes,
        mime_type: None,
    })
}

fn print_outcome(outcome: &CommandOutcome) {
    print_view(&outcome.view);
    if let Some(notice) = &outcome.notice {
        println!("* {notice}");
    }
    if let Some(alert) = &outcome.alert {
        println!("! {}", alert.message());
    }
}

fn print_view(view: &ViewState) {
    let tabs = view
        .tabs
        .iter()
        .map(|state| {
            if state.tab == view.visible_pane {
                format!("[{}]", state.tab.label())
            } else if state.enabled {
                state.tab.label().to_string()
            } else {
                format!("({})", state.tab.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    println!("{tabs}");
    println!("  {}  [{}]", view.status_text, view.identity.env_badge);

    let projects = view
        .project_options
        .iter()
        .skip(1)
        .map(|option| {
            let marker = if option.selected { "*" } else { " " };
            format!("  {marker} {}", option.label)
        })
        .collect::<Vec<_>>();
    if !projects.is_empty() {
        println!("projects:");
        for line in projects {
            println!("{line}");
        }
    }
    if !view.file_options.is_empty() {
        println!("files:");
        for option in &view.file_options {
            let marker = if option.selected { "*" } else { " " };
            println!("  {marker} {}", option.label);
        }
    }

    println!("editor: {}", view.editor_hint);
    if let Some(config) = &view.config {
        if view.visible_pane == client_core::Tab::Config {
            println!("requirements.txt:\n{}", config.manifest);
            println!("ENV_VARS.json:\n{}", config.env);
        }
    }
    match &view.export_link {
        Some(link) => println!("export: {} -> {link}", view.export_summary),
        None => println!("export: {}", view.export_summary),
    }
    for (operation, label) in &view.disabled_controls {
        println!("  busy: {} ({label})", operation.label());
    }
}
