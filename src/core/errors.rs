//! Error types for Lara API operations

use std::time::Duration;
use thiserror::Error;

/// Errors returned by the Lara client
#[derive(Error, Debug)]
pub enum LaraError {
    /// The service answered with a non-success status
    #[error("(HTTP {status}) {kind}: {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    /// The request could not be completed (connection, TLS, client timeout...)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The waiter gave up before the job reached a terminal state
    #[error("Timed out after {waited:?} waiting for job {job_id}")]
    Timeout {
        job_id: String,
        waited: Duration,
    },

    /// A document translation ended in the `error` state
    #[error("Document {id} failed: {reason}")]
    DocumentFailed {
        id: String,
        reason: String,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response: {message}")]
    InvalidResponse {
        message: String,
    },

    /// Caller supplied an argument the client cannot send
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    /// Credentials could not be resolved
    #[error("Credentials error: {message}")]
    Credentials {
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LaraError {
    /// HTTP status reported by the service, if this is an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            LaraError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 404 reported by the service
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True when the waiter stopped polling because of the time bound
    pub fn is_timeout(&self) -> bool {
        matches!(self, LaraError::Timeout { .. })
    }

    /// Build an API error from a status and an error response body.
    ///
    /// The service wraps errors as `{"error": {"type": ..., "message": ...}}`;
    /// anything else falls back to `UnknownError`.
    pub(crate) fn from_response_body(status: u16, body: &[u8]) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();
        let error = parsed.as_ref().and_then(|v| v.get("error"));

        let kind = error
            .and_then(|e| e.get("type"))
            .and_then(|t| t.as_str())
            .unwrap_or("UnknownError")
            .to_string();
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or("An unknown error occurred")
            .to_string();

        LaraError::Api {
            status,
            kind,
            message,
        }
    }
}

impl From<config::ConfigError> for LaraError {
    fn from(err: config::ConfigError) -> Self {
        LaraError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type for Lara operations
pub type Result<T> = std::result::Result<T, LaraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_body() {
        let body = br#"{"status":401,"error":{"type":"AuthenticationException","message":"Invalid signature"}}"#;
        let err = LaraError::from_response_body(401, body);

        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.to_string(),
            "(HTTP 401) AuthenticationException: Invalid signature"
        );
    }

    #[test]
    fn test_api_error_from_non_json_body() {
        let err = LaraError::from_response_body(502, b"<html>Bad Gateway</html>");

        match err {
            LaraError::Api { status, kind, message } => {
                assert_eq!(status, 502);
                assert_eq!(kind, "UnknownError");
                assert_eq!(message, "An unknown error occurred");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_timeout_is_not_api_error() {
        let err = LaraError::Timeout {
            job_id: "imp_1".to_string(),
            waited: Duration::from_secs(3),
        };
        assert!(err.is_timeout());
        assert!(err.status().is_none());
        assert!(!err.is_not_found());
    }
}
