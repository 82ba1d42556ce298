//! Error types for Consul operations.
//!
//! This module provides the error type shared by all Consul clients, including the
//! conversion of HTTP failures and status codes into structured variants.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for Consul operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Consul agent is unreachable or temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Operation timed out
    #[error("Timeout waiting for Consul: {0}")]
    Timeout(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request with details
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// ACL token missing or lacking permissions
    #[error("Permission denied: {0}")]
    Unauthorized(String),

    /// Conflict error
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Argument validation failed before any request was sent
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to parse a Consul response
    #[error("Failed to parse Consul response: {0}")]
    ParseError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Invalid identifier (session, ACL, event)
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// Consul refused a write operation
    #[error("Operation rejected: {0}")]
    Rejected(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Specialized result type for Consul operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Conflict(_) => "CONFLICT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InvalidId(_) => "INVALID_ID",
            Self::Rejected(_) => "REJECTED",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the request that produced this error may succeed when retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::ServiceUnavailable(_) | Self::HttpError(_)
        )
    }

    /// Build an error from a non-success HTTP status and the response body.
    #[must_use]
    pub fn from_status(status: StatusCode, text: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::NotFound(text),
            StatusCode::BAD_REQUEST => Self::BadRequest(text),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(text),
            StatusCode::CONFLICT => Self::Conflict(text),
            StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => {
                Self::ServiceUnavailable(format!("Consul temporarily unavailable: {text}"))
            }
            status if status.is_server_error() => {
                Self::ServiceUnavailable(format!("Consul server error {status}: {text}"))
            }
            _ => Self::HttpError(format!("Consul error {status}: {text}")),
        }
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Self::InvalidId(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Self::ParseError(format!("invalid base64 value: {err}"))
    }
}
