use std::io;
use thiserror::Error;

/// Unified error type for the home assistant application
#[derive(Error, Debug)]
pub enum HomechatError {
    /// The chat service failed or returned malformed data
    #[error("Service error: {0}")]
    Service(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),
}

impl HomechatError {
    /// True when the chat service could not produce a reply. Such errors abort the turn.
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            HomechatError::Service(_) | HomechatError::Network(_) | HomechatError::Serialization(_)
        )
    }
}

impl From<reqwest::Error> for HomechatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HomechatError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            HomechatError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            HomechatError::Service(format!("Service returned error status: {}", err))
        } else if err.is_decode() {
            HomechatError::Service(format!("Malformed service response: {}", err))
        } else {
            HomechatError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for HomechatError {
    fn from(err: serde_json::Error) -> Self {
        HomechatError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for HomechatError {
    fn from(err: serde_yml::Error) -> Self {
        HomechatError::Serialization(format!("YAML error: {}", err))
    }
}

/// Failures local to a single tool call.
///
/// None of these abort a turn: the dispatcher folds each one into a `tool`
/// message so the model can react to it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid argument for {tool}: {message}")]
    InvalidArgument { tool: String, message: String },

    #[error("{tool} failed: {message}")]
    HandlerFailure { tool: String, message: String },

    #[error("Lamp '{0}' not found")]
    StateNotFound(String),
}

impl ToolError {
    pub fn invalid(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::InvalidArgument {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn failure(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::HandlerFailure {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_failures_are_flagged() {
        assert!(HomechatError::Service("boom".into()).is_service_failure());
        assert!(HomechatError::Network("down".into()).is_service_failure());
        assert!(!HomechatError::Input("empty".into()).is_service_failure());
        assert!(!HomechatError::Config("bad".into()).is_service_failure());
    }

    #[test]
    fn tool_errors_render_for_the_model() {
        let err = ToolError::invalid("toggle_lamp", "state must be one of on, off, blink");
        assert_eq!(
            err.to_string(),
            "Invalid argument for toggle_lamp: state must be one of on, off, blink"
        );
        assert_eq!(
            ToolError::StateNotFound("desk".into()).to_string(),
            "Lamp 'desk' not found"
        );
    }
}
