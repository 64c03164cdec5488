//! # Error Types
//!
//! Unified error handling for deployment and lifecycle operations.

use std::time::Duration;
use thiserror::Error;

use crate::constants::TRANSIENT_STATE_MARKER;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, DeployError>;

#[derive(Debug, Error)]
pub enum DeployError {
    /// Non-transient failure from a mutating call, or invalid local configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-success response from the NiFi REST API
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Template format error: {0}")]
    TemplateFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout waiting for operation: {operation} (waited {waited:?})")]
    Timeout { operation: String, waited: Duration },

    #[error("Dependency cycle in process group {group_id} among connections {pending:?}")]
    DependencyCycle {
        group_id: String,
        pending: Vec<String>,
    },
}

impl DeployError {
    /// Create an API error from an HTTP response
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a template format error
    pub fn template_error(message: impl Into<String>) -> Self {
        Self::TemplateFormat(message.into())
    }

    /// Whether the remote service rejected a state change only because the
    /// component is still in the middle of stopping.
    #[must_use]
    pub fn is_transient_state_conflict(&self) -> bool {
        match self {
            DeployError::Api { message, .. } => message.trim_end().ends_with(TRANSIENT_STATE_MARKER),
            _ => false,
        }
    }

    /// Message carried by the remote service, or the rendered error otherwise
    #[must_use]
    pub fn remote_message(&self) -> String {
        match self {
            DeployError::Api { status, message } => format!("HTTP {status}: {message}"),
            other => other.to_string(),
        }
    }
}
