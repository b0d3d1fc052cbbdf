use thiserror::Error;

use crate::client::ApiError;
use crate::error::ErrorCategory;

/// Session-level authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Access token expiry could not be decoded")]
    MalformedToken,
    #[error("Session ended while the request was in flight")]
    SessionEnded,
    #[error("Missing authentication tokens")]
    MissingTokens,
    #[error("Sign-in failed: {0}")]
    Callback(String),
    #[error("Failed to get user data")]
    UserUnavailable,
    #[error("Storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Api(err) => err.category(),
            Self::Storage(_) => ErrorCategory::Storage,
            Self::MalformedToken => ErrorCategory::Serialization,
            _ => ErrorCategory::Authentication,
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Storage(error.to_string())
    }
}
