//! Error types for the Carespace API

use std::time::Duration;
use thiserror::Error;

use crate::payload::JsonMap;

/// Boxed low-level failure carried by network errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Kind of a [`CarespaceError`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authentication,
    Validation,
    NotFound,
    RateLimit,
    Server,
    Network,
    Timeout,
    Generic,
    Serialization,
    Decode,
    Config,
}

/// Core error type for Carespace API operations
///
/// HTTP-level variants carry the status code and the decoded error body
/// (empty when the body was not a JSON object).
#[derive(Error, Debug)]
pub enum CarespaceError {
    /// Invalid, expired or missing credential
    #[error("{}", with_status(.status, .message))]
    Authentication {
        message: String,
        status: Option<u16>,
        body: JsonMap,
    },

    /// Malformed request or parameters
    #[error("{}", with_status(.status, .message))]
    Validation {
        message: String,
        status: Option<u16>,
        body: JsonMap,
    },

    /// Target resource does not exist
    #[error("{}", with_status(.status, .message))]
    NotFound {
        message: String,
        status: Option<u16>,
        body: JsonMap,
    },

    /// Request throttled by the server
    #[error("{}", with_status(.status, .message))]
    RateLimit {
        message: String,
        status: Option<u16>,
        /// Advisory delay in seconds from the `Retry-After` header
        retry_after: Option<u64>,
        body: JsonMap,
    },

    /// Remote-side failure (5xx)
    #[error("{}", with_status(.status, .message))]
    Server {
        message: String,
        status: Option<u16>,
        body: JsonMap,
    },

    /// Transport-level failure (connection refused, DNS, reset)
    #[error("{message}: {source}")]
    Network {
        message: String,
        #[source]
        source: BoxError,
    },

    /// An attempt exceeded the configured timeout
    #[error("{message}")]
    Timeout { message: String, duration: Duration },

    /// Catch-all for anything not otherwise classified
    #[error("{}", with_status(.status, .message))]
    Generic {
        message: String,
        status: Option<u16>,
        body: JsonMap,
    },

    /// A request payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A response did not match the expected model
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

fn with_status(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("HTTP {}: {}", status, message),
        None => message.to_string(),
    }
}

/// Result type alias for Carespace operations
pub type Result<T> = std::result::Result<T, CarespaceError>;

impl CarespaceError {
    /// Build a generic error with only a message
    pub fn generic(message: impl Into<String>) -> Self {
        CarespaceError::Generic {
            message: message.into(),
            status: None,
            body: JsonMap::new(),
        }
    }

    /// Build a client-side validation error (no HTTP status)
    pub fn validation(message: impl Into<String>) -> Self {
        CarespaceError::Validation {
            message: message.into(),
            status: None,
            body: JsonMap::new(),
        }
    }

    /// Build an authentication error raised outside of an HTTP response
    pub fn authentication(message: impl Into<String>) -> Self {
        CarespaceError::Authentication {
            message: message.into(),
            status: None,
            body: JsonMap::new(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CarespaceError::Authentication { .. } => ErrorKind::Authentication,
            CarespaceError::Validation { .. } => ErrorKind::Validation,
            CarespaceError::NotFound { .. } => ErrorKind::NotFound,
            CarespaceError::RateLimit { .. } => ErrorKind::RateLimit,
            CarespaceError::Server { .. } => ErrorKind::Server,
            CarespaceError::Network { .. } => ErrorKind::Network,
            CarespaceError::Timeout { .. } => ErrorKind::Timeout,
            CarespaceError::Generic { .. } => ErrorKind::Generic,
            CarespaceError::Serialization(_) => ErrorKind::Serialization,
            CarespaceError::Decode(_) => ErrorKind::Decode,
            CarespaceError::Config(_) => ErrorKind::Config,
        }
    }

    /// Human-readable message, without the status prefix
    pub fn message(&self) -> &str {
        match self {
            CarespaceError::Authentication { message, .. }
            | CarespaceError::Validation { message, .. }
            | CarespaceError::NotFound { message, .. }
            | CarespaceError::RateLimit { message, .. }
            | CarespaceError::Server { message, .. }
            | CarespaceError::Network { message, .. }
            | CarespaceError::Timeout { message, .. }
            | CarespaceError::Generic { message, .. } => message,
            CarespaceError::Serialization(message)
            | CarespaceError::Decode(message)
            | CarespaceError::Config(message) => message,
        }
    }

    /// HTTP status code of the failed response, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CarespaceError::Authentication { status, .. }
            | CarespaceError::Validation { status, .. }
            | CarespaceError::NotFound { status, .. }
            | CarespaceError::RateLimit { status, .. }
            | CarespaceError::Server { status, .. }
            | CarespaceError::Generic { status, .. } => *status,
            _ => None,
        }
    }

    /// Decoded error body of the failed response, if any
    pub fn body(&self) -> Option<&JsonMap> {
        match self {
            CarespaceError::Authentication { body, .. }
            | CarespaceError::Validation { body, .. }
            | CarespaceError::NotFound { body, .. }
            | CarespaceError::RateLimit { body, .. }
            | CarespaceError::Server { body, .. }
            | CarespaceError::Generic { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Advisory retry delay in seconds (rate-limit errors only)
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            CarespaceError::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Whether the transport retries this failure with backoff.
    ///
    /// Only failures that never produced a response qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CarespaceError::Network { .. } | CarespaceError::Timeout { .. }
        ) || matches!(self, CarespaceError::Generic { status: None, .. })
    }
}

impl From<serde_json::Error> for CarespaceError {
    fn from(err: serde_json::Error) -> Self {
        CarespaceError::Serialization(err.to_string())
    }
}
