use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Project, ProjectId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListingResponse {
    pub project: Project,
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRepoRequest {
    pub repo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    pub repo_name: String,
    pub description: String,
    pub private: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResponse {
    pub repo: String,
    pub html_url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUser {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl HostUser {
    pub fn display_name(&self) -> Option<String> {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            Some(name.to_string())
        }
    }
}

/// Identity and theme readback offered by the host application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIdentity {
    pub user: Option<HostUser>,
    #[serde(rename = "colorScheme")]
    pub color_scheme: Option<String>,
    pub platform: Option<String>,
}

/// Outbound payloads handed to the host application. Serialized to a single
/// JSON string per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEvent {
    UserMessage {
        source: String,
        text: String,
        user: HostUser,
        #[serde(rename = "colorScheme")]
        color_scheme: Option<String>,
        platform: Option<String>,
        ts: DateTime<Utc>,
    },
    ProjectPublished {
        project_id: ProjectId,
        export_url: String,
        repo: String,
        html_url: String,
    },
    ProjectInfo {
        project_id: ProjectId,
        project_name: String,
        export_url: String,
        file_count: usize,
    },
}

impl BridgeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeEvent::UserMessage { .. } => "user_message",
            BridgeEvent::ProjectPublished { .. } => "project_published",
            BridgeEvent::ProjectInfo { .. } => "project_info",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_uses_host_field_names() {
        let event = BridgeEvent::UserMessage {
            source: "send_button".to_string(),
            text: "hi".to_string(),
            user: HostUser {
                id: Some(7),
                ..HostUser::default()
            },
            color_scheme: Some("dark".to_string()),
            platform: None,
            ts: "2024-01-01T00:00:00Z".parse().expect("timestamp"),
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["type"], "user_message");
        assert_eq!(value["colorScheme"], "dark");
        assert_eq!(value["user"]["id"], 7);
        assert!(value["user"]["username"].is_null());
        assert_eq!(value["ts"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn publish_response_keeps_unknown_fields() {
        let raw = r#"{"repo":"me/demo","html_url":"https://example.test/me/demo","default_branch":"main"}"#;
        let parsed: PublishResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.repo, "me/demo");
        assert_eq!(parsed.extra["default_branch"], "main");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let user = HostUser {
            username: Some("ada".to_string()),
            ..HostUser::default()
        };
        assert_eq!(user.display_name().as_deref(), Some("ada"));
        let user = HostUser {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            ..HostUser::default()
        };
        assert_eq!(user.display_name().as_deref(), Some("Ada Lovelace"));
    }
}
