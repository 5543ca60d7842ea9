use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use client_core::{view::Tab, UserCommand};
use shared::domain::{ConfigKind, ProjectId};

pub const HELP: &str = "\
commands:
  projects                         refresh the project list
  create [name]                    create a project
  select [id]                      select a project (no id clears the selection)
  import <url>                     import a remote repository into the project
  upload <local-path> [dest]       upload a local file
  open <path>                      open a project file in the editor
  new                              start a blank unsaved file
  edit <text>                      replace the editor buffer (\\n for newlines)
  save [path]                      save the editor buffer
  config <manifest|env> <text>     save a config file (\\n for newlines)
  reload                           refetch the selected project
  publish <repo> [--private] [description]
  send <text>                      send a message to the host app
  info                             share project info with the host app
  haptic                           ask the host app for an impact hint
  tab <name>                       switch the visible pane
  view                             print the current view
  quit";

#[derive(Debug)]
pub enum ShellCommand {
    Run(UserCommand),
    Upload {
        local_path: PathBuf,
        destination: Option<String>,
    },
    View,
    Help,
    Quit,
}

pub fn parse_command(line: &str, default_project_name: &str) -> Result<ShellCommand> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "projects" => UserCommand::ListProjects,
        "create" => UserCommand::CreateProject {
            name: if rest.is_empty() {
                default_project_name.to_string()
            } else {
                rest.to_string()
            },
        },
        "select" => UserCommand::SelectProject {
            id: (!rest.is_empty()).then(|| ProjectId::from(rest)),
        },
        "import" => UserCommand::ImportRepo {
            repo_url: required(rest, "import <url>")?.to_string(),
        },
        "upload" => {
            let rest = required(rest, "upload <local-path> [dest]")?;
            let (local, destination) = match rest.split_once(char::is_whitespace) {
                Some((local, dest)) => (local, Some(dest.trim().to_string())),
                None => (rest, None),
            };
            return Ok(ShellCommand::Upload {
                local_path: PathBuf::from(local),
                destination,
            });
        }
        "open" => UserCommand::OpenFile {
            path: required(rest, "open <path>")?.to_string(),
        },
        "new" => UserCommand::NewFile,
        "edit" => UserCommand::EditBuffer {
            text: unescape(rest),
        },
        "save" => UserCommand::SaveFile {
            path: (!rest.is_empty()).then(|| rest.to_string()),
        },
        "config" => {
            let usage = "config <manifest|env> <text>";
            let rest = required(rest, usage)?;
            let (kind, content) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let kind: ConfigKind = kind.parse().map_err(|err| anyhow!("{err}; usage: {usage}"))?;
            UserCommand::SaveConfig {
                kind,
                content: unescape(content.trim_start()),
            }
        }
        "reload" => UserCommand::Reload,
        "publish" => parse_publish(rest)?,
        "send" => UserCommand::SendMessage {
            source: "shell".to_string(),
            text: rest.to_string(),
        },
        "info" => UserCommand::ShareProjectInfo,
        "haptic" => UserCommand::Haptic,
        "tab" => {
            let tab: Tab = required(rest, "tab <name>")?
                .parse()
                .map_err(|err: String| anyhow!(err))?;
            UserCommand::SwitchTab(tab)
        }
        "view" => return Ok(ShellCommand::View),
        "help" | "?" => return Ok(ShellCommand::Help),
        "quit" | "exit" => return Ok(ShellCommand::Quit),
        "" => bail!("empty command"),
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(ShellCommand::Run(command))
}

fn parse_publish(rest: &str) -> Result<UserCommand> {
    let mut repo_name = None;
    let mut private = false;
    let mut description = Vec::new();
    for word in rest.split_whitespace() {
        if word == "--private" {
            private = true;
        } else if repo_name.is_none() {
            repo_name = Some(word.to_string());
        } else {
            description.push(word);
        }
    }
    let Some(repo_name) = repo_name else {
        bail!("usage: publish <repo> [--private] [description]");
    };
    Ok(UserCommand::Publish {
        repo_name,
        description: description.join(" "),
        private,
    })
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str> {
    if rest.is_empty() {
        bail!("usage: {usage}");
    }
    Ok(rest)
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
