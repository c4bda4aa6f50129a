//! Errors raised while talking to the access backend.

use thiserror::Error;

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur during backend operations.
///
/// A rejected card is not an error: it is reported as
/// [`AuthorizationOutcome::Denied`](crate::AuthorizationOutcome::Denied).
/// These variants cover the cases where no answer was obtained at all.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The configured endpoint is not a valid absolute URL.
    #[error("Invalid endpoint URL {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Connection, timeout or body-read failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Simulated failure injected by the mock backend.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// Create a new invalid endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a new unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_endpoint_display() {
        let error = BackendError::invalid_endpoint("not a url", "relative URL without a base");
        assert_eq!(
            error.to_string(),
            "Invalid endpoint URL \"not a url\": relative URL without a base"
        );
    }

    #[test]
    fn test_unavailable_display() {
        let error = BackendError::unavailable("connection refused");
        assert_eq!(error.to_string(), "Backend unavailable: connection refused");
    }
}
