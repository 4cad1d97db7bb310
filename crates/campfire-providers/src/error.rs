//! Error types for event lookups.
//!
//! Every failure while resolving a link, talking to the Campfire API or
//! shaping its data ends up as a [`ProviderError`] with one of a small set of
//! codes. Errors are surfaced to the user as a single message string and
//! never retried.

use std::fmt;

use campfire_core::TimeParseError;
use thiserror::Error;

/// Message shown when the upstream returns no event.
pub const NOT_FOUND_MESSAGE: &str = "No event data found.";

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// The input could not be mapped to an identifier.
    Resolution,
    /// Network failure, timeout or non-success status from an upstream.
    Upstream,
    /// The upstream returned an empty result set.
    NotFound,
    /// An expected field was missing or malformed.
    Parse,
    /// Invalid configuration (bad timezone, bad endpoint).
    Configuration,
}

impl ProviderErrorCode {
    /// Returns a machine-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolution => "resolution_error",
            Self::Upstream => "upstream_error",
            Self::NotFound => "not_found",
            Self::Parse => "parse_error",
            Self::Configuration => "configuration_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while looking up an event.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a resolution error.
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Resolution, message)
    }

    /// Creates an upstream error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Upstream, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Parse, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Configuration, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the message shown to the user at the request boundary.
    pub fn user_message(&self) -> String {
        match self.code {
            ProviderErrorCode::NotFound => NOT_FOUND_MESSAGE.to_string(),
            _ => format!("Couldn't process link: {}", self.message),
        }
    }

    /// Returns a copy without the source chain.
    pub(crate) fn detached(&self) -> Self {
        Self::new(self.code, self.message.clone())
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<TimeParseError> for ProviderError {
    fn from(err: TimeParseError) -> Self {
        Self::parse(err.to_string()).with_source(err)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_names() {
        assert_eq!(ProviderErrorCode::Resolution.as_str(), "resolution_error");
        assert_eq!(ProviderErrorCode::Upstream.as_str(), "upstream_error");
        assert_eq!(ProviderErrorCode::NotFound.as_str(), "not_found");
        assert_eq!(ProviderErrorCode::Parse.as_str(), "parse_error");
    }

    #[test]
    fn provider_error_creation() {
        let err = ProviderError::upstream("connection refused");
        assert_eq!(err.code(), ProviderErrorCode::Upstream);
        assert_eq!(err.message(), "connection refused");
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::parse("event time is missing");
        assert_eq!(err.to_string(), "parse_error: event time is missing");
    }

    #[test]
    fn not_found_user_message() {
        let err = ProviderError::not_found("no event for abc");
        assert_eq!(err.user_message(), "No event data found.");
    }

    #[test]
    fn other_user_messages() {
        let err = ProviderError::upstream("API error (500 Internal Server Error)");
        assert_eq!(
            err.user_message(),
            "Couldn't process link: API error (500 Internal Server Error)"
        );
    }

    #[test]
    fn from_time_parse_error() {
        use std::error::Error;
        let err: ProviderError = TimeParseError::Missing.into();
        assert_eq!(err.code(), ProviderErrorCode::Parse);
        assert!(err.source().is_some());
    }

    #[test]
    fn detached_drops_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("reset");
        let err = ProviderError::upstream("request failed").with_source(io_err);
        let copy = err.detached();
        assert_eq!(copy.code(), err.code());
        assert_eq!(copy.message(), err.message());
        assert!(copy.source().is_none());
    }
}
