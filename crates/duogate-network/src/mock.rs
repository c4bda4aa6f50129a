//! In-process access backend for development and testing.
//!
//! The mock answers every authorization with a configurable response and
//! records every call it receives. Clones share that state, so a test keeps
//! one clone for assertions and hands another to the code under test.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use duogate_core::{CardCode, Direction};
use tracing::debug;

use crate::backend::{AccessBackend, AuthorizationOutcome};
use crate::error::{BackendError, Result};

/// How the mock answers authorization requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockResponse {
    /// Grant every card.
    Grant,

    /// Deny every card with a 200 "DENIED" body.
    #[default]
    Deny,

    /// Fail every call as if the network were down.
    Fail,
}

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Authorize { code: CardCode, direction: Direction },
    Passage { code: CardCode, direction: Direction },
}

#[derive(Debug, Default)]
struct MockState {
    response: MockResponse,
    latency: Duration,
    calls: Vec<BackendCall>,
}

/// Mock access backend.
///
/// # Example
///
/// ```
/// use duogate_core::{CardCode, Direction};
/// use duogate_network::{AccessBackend, MockBackend, MockResponse};
///
/// # #[tokio::main]
/// # async fn main() -> duogate_network::Result<()> {
/// let backend = MockBackend::with_response(MockResponse::Grant);
/// let code = CardCode::new("1234").unwrap();
///
/// assert!(backend.authorize(&code, Direction::In).await?.is_granted());
/// assert_eq!(backend.calls().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create a mock that denies every card.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock with the given response.
    pub fn with_response(response: MockResponse) -> Self {
        let backend = Self::new();
        backend.set_response(response);
        backend
    }

    /// Change the response for subsequent calls.
    pub fn set_response(&self, response: MockResponse) {
        self.lock().response = response;
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    /// Passage notifications received so far.
    pub fn passages(&self) -> Vec<(CardCode, Direction)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::Passage { code, direction } => Some((code.clone(), *direction)),
                BackendCall::Authorize { .. } => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and return the configured response and latency.
    fn record(&self, call: BackendCall) -> (MockResponse, Duration) {
        let mut state = self.lock();
        debug!(?call, "Mock backend call");
        state.calls.push(call);
        (state.response, state.latency)
    }
}

impl AccessBackend for MockBackend {
    async fn authorize(
        &self,
        code: &CardCode,
        direction: Direction,
    ) -> Result<AuthorizationOutcome> {
        let (response, latency) = self.record(BackendCall::Authorize {
            code: code.clone(),
            direction,
        });
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match response {
            MockResponse::Grant => Ok(AuthorizationOutcome::Granted),
            MockResponse::Deny => Ok(AuthorizationOutcome::Denied {
                status: 200,
                body: "DENIED".to_string(),
            }),
            MockResponse::Fail => Err(BackendError::unavailable("mock backend offline")),
        }
    }

    async fn notify_passage(&self, code: &CardCode, direction: Direction) -> Result<u16> {
        let (response, latency) = self.record(BackendCall::Passage {
            code: code.clone(),
            direction,
        });
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match response {
            MockResponse::Fail => Err(BackendError::unavailable("mock backend offline")),
            MockResponse::Grant | MockResponse::Deny => Ok(200),
        }
    }
}
