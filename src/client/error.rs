use reqwest::StatusCode;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Maximum length for error response bodies carried in error messages.
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Uniform failure shape for every call made through [`ApiClient`](super::ApiClient).
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 401. Callers must not retry after this.
    #[error("Unauthorized")]
    Unauthorized,
    #[error("API error (status {status}): {message}")]
    Http { status: u16, message: String },
    #[error("Network error: {message}")]
    Network { message: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Build an error for a non-2xx response that is not a 401.
    ///
    /// Uses the `message` field of a JSON body when present, otherwise the
    /// status line.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(|m| m.to_string())
            })
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status_line(status));
        Self::Http {
            status: status.as_u16(),
            message: truncate_body(&message),
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized => ErrorCategory::Authentication,
            Self::Http { status, .. } => match status {
                403 => ErrorCategory::Authentication,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::Network { .. } => ErrorCategory::Network,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::InvalidUrl(_) => ErrorCategory::Configuration,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Serialization(error.to_string())
        } else {
            Self::Network {
                message: error.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("HTTP {}: {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_response_prefers_json_message() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Title is required","status":400}"#,
        );
        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Title is required");
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[test]
    fn from_response_falls_back_to_status_line() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.to_string(), "API error (status 502): HTTP 502: Bad Gateway");
        assert_eq!(err.category(), ErrorCategory::Server);
    }

    #[test]
    fn from_response_ignores_empty_message() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, r#"{"message":""}"#);
        assert!(matches!(
            err,
            ApiError::Http { status: 404, ref message } if message == "HTTP 404: Not Found"
        ));
    }

    #[test]
    fn long_messages_are_truncated() {
        let body = format!(r#"{{"message":"{}"}}"#, "x".repeat(800));
        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let ApiError::Http { message, .. } = err else {
            panic!("expected Http");
        };
        assert!(message.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn unauthorized_reports_401() {
        assert_eq!(ApiError::Unauthorized.status(), Some(401));
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert_eq!(
            ApiError::Unauthorized.category(),
            ErrorCategory::Authentication
        );
    }
}
