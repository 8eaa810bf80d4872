//! Error types for example-platform operations.
//!
//! A non-2xx status is not an error at the transport level: it comes back
//! as a [`Response`](crate::Response) for the caller to inspect. The errors
//! here cover what is left: the request never completed, the body could not
//! be encoded or decoded, or a caller turned a status into an error with
//! [`Error::api`].

use std::fmt;

/// Result type alias for example-platform operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of platform errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, timeout or server-side errors (transient, retryable).
    Network,
    /// The addressed resource does not exist.
    NotFound,
    /// Malformed request or response body.
    Format,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::NotFound => "Resource not found",
            Self::Format => "Invalid request or response body",
            Self::Other => "Unexpected error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the example platform.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP request did not complete.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The API answered with a status the caller treats as failure.
    #[error("API error: {status} {reason}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase.
        reason: String,
    },

    /// A request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// A response body could not be deserialized.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Create an API error from a status code.
    pub fn api(status: u16, reason: impl Into<String>) -> Self {
        Self::Api {
            status,
            reason: reason.into(),
        }
    }

    /// Get the error category for retry logic.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http(_) => ErrorCategory::Network,
            Error::Api { status: 404, .. } => ErrorCategory::NotFound,
            Error::Api { status, .. } if *status >= 500 || *status == 429 => {
                ErrorCategory::Network
            }
            Error::Api { .. } => ErrorCategory::Other,
            Error::Encode(_) | Error::InvalidResponse(_) => ErrorCategory::Format,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        Self::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        assert_eq!(Error::Http("refused".into()).category(), ErrorCategory::Network);
        assert_eq!(Error::api(404, "Not Found").category(), ErrorCategory::NotFound);
        assert_eq!(
            Error::api(500, "Internal Server Error").category(),
            ErrorCategory::Network
        );
        assert_eq!(Error::api(429, "Too Many Requests").category(), ErrorCategory::Network);
        assert_eq!(Error::api(400, "Bad Request").category(), ErrorCategory::Other);
        assert_eq!(
            Error::InvalidResponse("eof".into()).category(),
            ErrorCategory::Format
        );
    }

    #[test]
    fn test_retryable() {
        assert!(Error::api(503, "Service Unavailable").is_retryable());
        assert!(!Error::api(404, "Not Found").is_retryable());
        assert!(!Error::Encode("bad".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::api(500, "Internal Server Error").to_string(),
            "API error: 500 Internal Server Error"
        );
    }
}
