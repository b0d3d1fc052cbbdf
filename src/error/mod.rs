//! Error types for Stanza.

use thiserror::Error;

use crate::auth::AuthError;
use crate::client::ApiError;

/// Primary error type for all Stanza operations.
#[derive(Error, Debug)]
pub enum StanzaError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(AuthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Network,
    Server,
    Api,
    Configuration,
    Serialization,
    Storage,
}

impl StanzaError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Api(err) => err.category(),
            Self::Auth(err) => err.category(),
            Self::Io(_) => ErrorCategory::Storage,
            Self::Serialization(_) => ErrorCategory::Serialization,
        }
    }

    /// Whether the session was (or must be) torn down because of this error.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Api(err) => err.is_unauthorized(),
            Self::Auth(AuthError::Api(err)) => err.is_unauthorized(),
            _ => false,
        }
    }
}

impl From<AuthError> for StanzaError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Api(api) => StanzaError::Api(api),
            other => StanzaError::Auth(other),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, StanzaError>;
