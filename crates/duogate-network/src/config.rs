//! Backend endpoint configuration.

use std::time::Duration;

use duogate_core::constants::{DEFAULT_ACCEPT_PREFIX, DEFAULT_REQUEST_TIMEOUT_MS};
use serde::{Deserialize, Serialize};

/// Endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://example.com";

/// Configuration of the HTTP access backend.
///
/// # Example
///
/// ```
/// use duogate_network::BackendConfig;
///
/// let config = BackendConfig {
///     endpoint: "http://10.0.0.5:8080/gate".to_string(),
///     ..BackendConfig::default()
/// };
/// assert_eq!(config.accept_prefix, "OK");
/// assert!(!config.verbose);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL; query parameters are appended per request.
    pub endpoint: String,

    /// A 200 response whose body starts with this token grants access.
    pub accept_prefix: String,

    /// Sent as `verbose=1` so the backend answers with a readable reason.
    pub verbose: bool,

    /// Upper bound for one request, connect included.
    pub request_timeout_ms: u64,
}

impl BackendConfig {
    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            accept_prefix: DEFAULT_ACCEPT_PREFIX.to_string(),
            verbose: false,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}
