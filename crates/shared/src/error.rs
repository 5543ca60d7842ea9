use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("ENV_VARS.json must be valid JSON: {0}")]
    InvalidJson(String),
    #[error("ENV_VARS.json must contain a JSON object")]
    NotAnObject,
    #[error("unknown config kind '{0}' (expected manifest or env)")]
    UnknownKind(String),
}
