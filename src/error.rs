//! Error types for GitInsights
//!
//! One enum covers every failure an aggregation can surface. Remote failures
//! keep the HTTP status, resolved URL and decoded body so callers can tell an
//! expired session apart from a transient remote problem or an empty result.
//! Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Result type alias for GitInsights operations
pub type Result<T> = std::result::Result<T, InsightsError>;

/// Comprehensive error type for GitInsights operations
#[derive(Error, Debug)]
pub enum InsightsError {
    /// Non-2xx response from the hosting API (other than 401/403)
    #[error("{status} error requesting {url}")]
    RemoteRequest {
        status: u16,
        url: String,
        body: serde_json::Value,
    },

    /// 401/403 response: the token is missing, invalid or expired
    #[error("{status} authentication error requesting {url}")]
    Auth {
        status: u16,
        url: String,
        body: serde_json::Value,
    },

    /// A reduction had nothing to reduce (e.g. oldest of zero items)
    #[error("No data: {0}")]
    EmptyResult(String),

    /// A 2xx body did not match the expected record shape
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP request errors (connect, timeout, unreadable body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// Coarse classification used by front ends to pick a reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Prompt the user to log in again
    Auth,
    /// Remote or transport failure, offer a retry
    Remote,
    /// Nothing to show, render a placeholder
    Empty,
    /// Anything else (bad config, decode failures, I/O)
    Other,
}

impl InsightsError {
    /// Build the error for a failed response, splitting out 401/403.
    pub fn from_status(status: u16, url: impl Into<String>, body: serde_json::Value) -> Self {
        let url = url.into();
        match status {
            401 | 403 => InsightsError::Auth { status, url, body },
            _ => InsightsError::RemoteRequest { status, url, body },
        }
    }

    /// HTTP status of a remote failure, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            InsightsError::RemoteRequest { status, .. } | InsightsError::Auth { status, .. } => {
                Some(*status)
            }
            InsightsError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Decoded error body returned by the API, if any
    pub fn body(&self) -> Option<&serde_json::Value> {
        match self {
            InsightsError::RemoteRequest { body, .. } | InsightsError::Auth { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, InsightsError::Auth { .. })
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, InsightsError::EmptyResult(_))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            InsightsError::Auth { .. } => ErrorKind::Auth,
            InsightsError::RemoteRequest { .. } | InsightsError::Http(_) => ErrorKind::Remote,
            InsightsError::EmptyResult(_) => ErrorKind::Empty,
            _ => ErrorKind::Other,
        }
    }
}

/// Map [`InsightsError::EmptyResult`] to `None` so callers can render a
/// placeholder; every other error still propagates
pub fn ok_or_empty<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_empty_result() => Ok(None),
        Err(e) => Err(e),
    }
}
