use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Opaque project identifier assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDocument {
    pub path: String,
    pub content: String,
}

impl FileDocument {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

pub const MANIFEST_PATH: &str = "requirements.txt";
pub const ENV_VARS_PATH: &str = "ENV_VARS.json";

/// The two well-known configuration documents every project carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKind {
    Manifest,
    Env,
}

impl ConfigKind {
    pub fn path(self) -> &'static str {
        match self {
            ConfigKind::Manifest => MANIFEST_PATH,
            ConfigKind::Env => ENV_VARS_PATH,
        }
    }

    pub fn default_content(self) -> String {
        match self {
            ConfigKind::Manifest => String::new(),
            ConfigKind::Env => {
                let mut example = serde_json::Map::new();
                example.insert(
                    "EXAMPLE_KEY".to_string(),
                    serde_json::Value::String("value".to_string()),
                );
                serde_json::to_string_pretty(&serde_json::Value::Object(example))
                    .unwrap_or_else(|_| "{}".to_string())
            }
        }
    }

    pub fn default_document(self) -> FileDocument {
        FileDocument::new(self.path(), self.default_content())
    }

    /// Client-side precondition checked before any save is attempted.
    pub fn validate(self, content: &str) -> Result<(), ConfigError> {
        match self {
            ConfigKind::Manifest => Ok(()),
            ConfigKind::Env => {
                let value: serde_json::Value = serde_json::from_str(content)
                    .map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
                if value.is_object() {
                    Ok(())
                } else {
                    Err(ConfigError::NotAnObject)
                }
            }
        }
    }
}

impl std::str::FromStr for ConfigKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manifest" | "requirements" | "requirements.txt" => Ok(ConfigKind::Manifest),
            "env" | "env_vars" | "env_vars.json" => Ok(ConfigKind::Env),
            other => Err(ConfigError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPair {
    pub manifest: FileDocument,
    pub env: FileDocument,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_default_is_pretty_printed_example_object() {
        assert_eq!(
            ConfigKind::Env.default_content(),
            "{\n  \"EXAMPLE_KEY\": \"value\"\n}"
        );
        assert_eq!(ConfigKind::Manifest.default_content(), "");
    }

    #[test]
    fn env_validation_requires_a_json_object() {
        assert!(ConfigKind::Env.validate("{\"A\": \"1\"}").is_ok());
        assert!(matches!(
            ConfigKind::Env.validate("{not json"),
            Err(ConfigError::InvalidJson(_))
        ));
        assert!(matches!(
            ConfigKind::Env.validate("[1, 2]"),
            Err(ConfigError::NotAnObject)
        ));
        assert!(ConfigKind::Manifest.validate("{not json").is_ok());
    }

    #[test]
    fn parses_config_kind_aliases() {
        assert_eq!("ENV".parse::<ConfigKind>().ok(), Some(ConfigKind::Env));
        assert_eq!(
            "requirements.txt".parse::<ConfigKind>().ok(),
            Some(ConfigKind::Manifest)
        );
        assert!("secrets".parse::<ConfigKind>().is_err());
    }

    #[test]
    fn project_id_serializes_as_plain_string() {
        let project = Project {
            id: ProjectId::from("p1"),
            name: "demo".to_string(),
        };
        let json = serde_json::to_string(&project).expect("serialize");
        assert_eq!(json, r#"{"id":"p1","name":"demo"}"#);
    }
}
