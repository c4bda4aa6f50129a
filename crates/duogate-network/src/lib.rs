//! Access backend client for duogate.
//!
//! The gate asks a remote service two things: whether a swiped card may pass,
//! and (after the fact) that it did pass. This crate provides the
//! [`AccessBackend`] trait for those calls, an HTTP implementation built on
//! `reqwest`, and an in-process mock.
//!
//! # Components
//!
//! - **HttpBackend**: `GET` requests with the card code and direction in the
//!   query string
//! - **MockBackend**: configurable answers and a call log, for tests
//! - **AnyBackend**: enum dispatch over both, cheap to clone
//!
//! # Example
//!
//! ```no_run
//! use duogate_core::{CardCode, Direction};
//! use duogate_network::{AccessBackend, AnyBackend, BackendConfig, HttpBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend: AnyBackend = HttpBackend::new(BackendConfig::default())?.into();
//!
//! let code = CardCode::new("1234")?;
//! let outcome = backend.authorize(&code, Direction::In).await?;
//! println!("granted: {}", outcome.is_granted());
//! # Ok(())
//! # }
//! ```

#![allow(async_fn_in_trait)]

mod backend;
mod config;
mod error;
mod http;
mod mock;

pub use backend::{AccessBackend, AnyBackend, AuthorizationOutcome};
pub use config::{BackendConfig, DEFAULT_ENDPOINT};
pub use error::{BackendError, Result};
pub use http::HttpBackend;
pub use mock::{BackendCall, MockBackend, MockResponse};
