use shared::error::ConfigError;
use thiserror::Error;

use crate::{gateway::GatewayError, session::Operation};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),
    #[error("no project selected")]
    NoProjectSelected,
    #[error("{} is already in progress", .0.label())]
    Busy(Operation),
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("unexpected response from server: {0}")]
    Decode(String),
}

impl SessionError {
    pub fn validation(message: impl Into<String>) -> Self {
        SessionError::Validation(message.into())
    }
}

impl From<GatewayError> for SessionError {
    fn from(value: GatewayError) -> Self {
        match value {
            GatewayError::Remote { status, message } => SessionError::Remote { status, message },
            GatewayError::Transport(err) => SessionError::Transport(err.to_string()),
            GatewayError::InvalidUrl(message) => SessionError::Transport(message),
            GatewayError::Encode(message) | GatewayError::Decode(message) => {
                SessionError::Decode(message)
            }
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(value: ConfigError) -> Self {
        SessionError::Validation(value.to_string())
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(value: reqwest::Error) -> Self {
        SessionError::from(GatewayError::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_displays_server_message() {
        let err = SessionError::from(GatewayError::Remote {
            status: 409,
            message: "project exists".to_string(),
        });
        assert_eq!(err.to_string(), "project exists");
    }

    #[test]
    fn busy_names_the_operation() {
        let err = SessionError::Busy(Operation::Import);
        assert_eq!(err.to_string(), "import is already in progress");
    }

    #[test]
    fn config_errors_become_validation_errors() {
        let err = SessionError::from(ConfigError::NotAnObject);
        assert!(matches!(err, SessionError::Validation(_)));
    }
}
