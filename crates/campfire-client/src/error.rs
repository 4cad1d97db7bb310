//! Client error types.

use campfire_core::TracingError;
use campfire_providers::ProviderError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Lookup failure; displays the user-facing message.
    #[error("{}", .0.user_message())]
    Provider(#[from] ProviderError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering output failed.
    #[error("output error: {0}")]
    Output(String),

    /// Action failed (open, copy).
    #[error("action failed: {0}")]
    Action(String),

    /// Tracing could not be initialized.
    #[error(transparent)]
    Tracing(#[from] TracingError),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}
