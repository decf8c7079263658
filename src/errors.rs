// Copyright 2025 Cowboy AI, LLC.

//! Error types for task construction and graph queries

use thiserror::Error;

/// Errors that can occur while loading a task or building its graphs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    /// Malformed or missing specification field
    #[error("Schema error at {path}: {message}")]
    Schema {
        /// Location of the offending field (e.g. `designSpaces[2].components[1]`)
        path: String,
        /// What is wrong with it
        message: String,
    },

    /// Invalid numeric parameter for one design space
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Grid library failure opaque to this crate
    #[error("Internal error: {0}")]
    Internal(String),

    /// The input document is not valid YAML
    #[error("Parse error: {0}")]
    Parse(String),

    /// The input document could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// A query named a design space the task never declared
    #[error("Unknown design space: {0}")]
    UnknownDesignSpace(String),
}

/// Result type for task operations
pub type TaskResult<T> = Result<T, TaskError>;

impl From<serde_yaml::Error> for TaskError {
    fn from(err: serde_yaml::Error) -> Self {
        TaskError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(err: serde_json::Error) -> Self {
        TaskError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for TaskError {
    fn from(err: std::io::Error) -> Self {
        TaskError::Io(err.to_string())
    }
}

impl TaskError {
    /// Create a schema error at the given path
    pub fn schema(path: impl ToString, message: impl Into<String>) -> Self {
        TaskError::Schema {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        TaskError::Configuration(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        TaskError::Internal(msg.into())
    }

    /// Check if this is a schema error
    pub fn is_schema_error(&self) -> bool {
        matches!(self, TaskError::Schema { .. })
    }

    /// Check if this error is scoped to a single design space
    ///
    /// Such failures are recorded against the design space and do not stop
    /// sibling design spaces from building.
    pub fn is_design_space_scoped(&self) -> bool {
        matches!(self, TaskError::Configuration(_) | TaskError::Internal(_))
    }

    /// Offending field path for schema errors
    pub fn path(&self) -> Option<&str> {
        match self {
            TaskError::Schema { path, .. } => Some(path),
            _ => None,
        }
    }
}
