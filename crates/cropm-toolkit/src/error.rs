//! Toolkit error types.

use thiserror::Error;

/// Errors produced by toolkit backends.
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// The external program could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program ran and reported a failure.
    #[error("{operation} failed: {message}")]
    Failed { operation: String, message: String },

    /// The bridge produced output that could not be decoded.
    #[error("invalid output from {operation}: {source}")]
    InvalidOutput {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    /// No model with this name exists in the package.
    #[error("model '{name}' not found in {package}")]
    ModelNotFound { name: String, package: String },

    /// Filesystem access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolkitError {
    pub(crate) fn failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ToolkitError::Failed {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
