//! Access backend trait and dispatch wrapper.

use duogate_core::{CardCode, Direction};

use crate::Result;
use crate::http::HttpBackend;
use crate::mock::MockBackend;

/// Answer to an authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    /// The backend accepted the card.
    Granted,

    /// The backend answered, but not with an acceptance.
    Denied { status: u16, body: String },
}

impl AuthorizationOutcome {
    /// Whether access was granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Remote service that authorizes card codes and records passages.
///
/// Neither call retries. A transport failure is returned as an error and the
/// caller treats it as a rejection.
pub trait AccessBackend: Send + Sync {
    /// Ask whether `code` may pass in `direction`.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was obtained.
    async fn authorize(&self, code: &CardCode, direction: Direction)
    -> Result<AuthorizationOutcome>;

    /// Report that `code` passed in `direction`. Returns the HTTP status.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was obtained.
    async fn notify_passage(&self, code: &CardCode, direction: Direction) -> Result<u16>;
}

/// Enum wrapper for backend dispatch.
///
/// Cloning is cheap; every clone talks to the same backend. The controller
/// moves a clone into each detached notification task.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyBackend {
    /// HTTP backend.
    Http(HttpBackend),

    /// In-process backend for development and testing.
    Mock(MockBackend),
}

impl AccessBackend for AnyBackend {
    async fn authorize(
        &self,
        code: &CardCode,
        direction: Direction,
    ) -> Result<AuthorizationOutcome> {
        match self {
            Self::Http(backend) => backend.authorize(code, direction).await,
            Self::Mock(backend) => backend.authorize(code, direction).await,
        }
    }

    async fn notify_passage(&self, code: &CardCode, direction: Direction) -> Result<u16> {
        match self {
            Self::Http(backend) => backend.notify_passage(code, direction).await,
            Self::Mock(backend) => backend.notify_passage(code, direction).await,
        }
    }
}

impl From<HttpBackend> for AnyBackend {
    fn from(backend: HttpBackend) -> Self {
        Self::Http(backend)
    }
}

impl From<MockBackend> for AnyBackend {
    fn from(backend: MockBackend) -> Self {
        Self::Mock(backend)
    }
}
