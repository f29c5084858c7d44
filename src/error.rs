//! Error types for Redmine API operations.

use thiserror::Error;

/// Errors that can occur during Redmine API operations.
///
/// Every error produced by the transport carries the endpoint
/// (`METHOD path`) it came from so callers can render a useful message
/// without inspecting HTTP details.
#[derive(Debug, Error)]
pub enum RedmineError {
    /// Local validation failed before any request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration is missing or incomplete.
    #[error("Redmine configuration required: {0}")]
    Config(String),

    /// The API key is missing or was rejected (401).
    #[error("{endpoint}: authentication failed{}", suffix(.message))]
    Unauthorized { endpoint: String, message: String },

    /// The API key is valid but lacks the required privilege (403).
    #[error("{endpoint}: permission denied{}", suffix(.message))]
    Forbidden { endpoint: String, message: String },

    /// The addressed resource does not exist (404).
    #[error("{endpoint}: not found")]
    NotFound { endpoint: String },

    /// The service rejected the payload (422).
    #[error("{endpoint}: validation failed: {}", join_messages(.messages))]
    ValidationFailed {
        endpoint: String,
        messages: Vec<String>,
    },

    /// Optimistic-concurrency check failed (409).
    #[error("{endpoint}: conflict: {}", join_messages(.messages))]
    Conflict {
        endpoint: String,
        messages: Vec<String>,
    },

    /// The service answered with a 5xx status.
    #[error("{endpoint}: service unavailable (HTTP {status}){}", suffix(.message))]
    Server {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// The request never completed (DNS, connect, TLS, timeout).
    #[error("{endpoint}: network error: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Any other non-success status.
    #[error("{endpoint}: HTTP {status}{}", suffix(.message))]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// The caller cancelled the request.
    #[error("{endpoint}: request cancelled")]
    Cancelled { endpoint: String },

    /// The caller's deadline passed before the request completed.
    #[error("{endpoint}: deadline exceeded")]
    DeadlineExceeded { endpoint: String },

    /// A successful response body could not be decoded.
    #[error("{endpoint}: failed to parse response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON encoding error outside a request.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP client construction error.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse classification of [`RedmineError`] for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Config,
    Unauthorized,
    Forbidden,
    NotFound,
    ValidationFailed,
    Conflict,
    ServiceUnavailable,
    Cancelled,
    DeadlineExceeded,
    Decode,
    Other,
}

impl RedmineError {
    /// Shorthand for [`RedmineError::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Turn a bare JSON error into a [`RedmineError::Decode`] for `endpoint`.
    /// Other variants pass through unchanged.
    pub(crate) fn at_endpoint(self, endpoint: &str) -> Self {
        match self {
            Self::Json(source) => Self::Decode {
                endpoint: endpoint.to_string(),
                source,
            },
            other => other,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Config(_) => ErrorKind::Config,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Server { .. } | Self::Network { .. } => ErrorKind::ServiceUnavailable,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
            Self::Decode { .. } | Self::Json(_) => ErrorKind::Decode,
            Self::Api { .. } | Self::Url(_) | Self::Http(_) => ErrorKind::Other,
        }
    }

    /// Whether retrying the same call could reasonably succeed.
    ///
    /// The client never retries on its own.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ServiceUnavailable
    }

    /// Validation messages carried by the error, if any.
    pub fn messages(&self) -> &[String] {
        match self {
            Self::ValidationFailed { messages, .. } | Self::Conflict { messages, .. } => {
                messages.as_slice()
            }
            _ => &[],
        }
    }
}

fn join_messages(messages: &[String]) -> String {
    if messages.is_empty() {
        "no details provided".to_string()
    } else {
        messages.join("; ")
    }
}

fn suffix(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {message}")
    }
}

/// Result type alias for Redmine operations.
pub type Result<T> = core::result::Result<T, RedmineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_gains_endpoint() {
        let source = serde_json::from_str::<u64>("\"x\"").unwrap_err();
        let err = RedmineError::Json(source).at_endpoint("GET projects.json");
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().starts_with("GET projects.json: failed to parse response"));

        let untouched = RedmineError::invalid("bad").at_endpoint("GET projects.json");
        assert_eq!(untouched.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_validation_failed_keeps_every_message() {
        let err = RedmineError::ValidationFailed {
            endpoint: "POST issues.json".to_string(),
            messages: vec![
                "Subject cannot be blank".to_string(),
                "Tracker is not included in the list".to_string(),
            ],
        };

        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(err.messages().len(), 2);
        let rendered = err.to_string();
        assert!(rendered.contains("POST issues.json"));
        assert!(rendered.contains("Subject cannot be blank; Tracker is not included"));
    }

    #[test]
    fn test_server_error_is_retryable() {
        let err = RedmineError::Server {
            endpoint: "GET issues.json".to_string(),
            status: 503,
            message: String::new(),
        };
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "GET issues.json: service unavailable (HTTP 503)"
        );
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let not_found = RedmineError::NotFound {
            endpoint: "DELETE issues/9.json".to_string(),
        };
        assert!(!not_found.is_retryable());
        assert!(!RedmineError::invalid("bad include").is_retryable());
        assert_eq!(
            RedmineError::Cancelled {
                endpoint: "GET trackers.json".to_string()
            }
            .kind(),
            ErrorKind::Cancelled
        );
    }

    #[test]
    fn test_empty_messages_render_placeholder() {
        let err = RedmineError::Conflict {
            endpoint: "PUT projects/demo/wiki/Home.json".to_string(),
            messages: vec![],
        };
        assert!(err.to_string().ends_with("conflict: no details provided"));
    }
}
