//! HTTP access backend.
//!
//! Both calls are plain `GET` requests against one endpoint, distinguished by
//! their query string:
//!
//! ```text
//! authorize:  GET <endpoint>?code=1234&direction=in&verbose=0
//! passage:    GET <endpoint>?code=1234&direction=in&passed=1&verbose=0
//! ```
//!
//! A card is granted when the response is `200` and its body starts with the
//! configured accept token. Anything else (another status, another body) is a
//! denial. There is no retry.

use std::sync::Arc;

use duogate_core::constants::{PARAM_CODE, PARAM_DIRECTION, PARAM_PASSED, PARAM_VERBOSE};
use duogate_core::{CardCode, Direction};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info, warn};

use crate::backend::{AccessBackend, AuthorizationOutcome};
use crate::config::BackendConfig;
use crate::error::{BackendError, Result};

/// Access backend reached over HTTP.
///
/// # Example
///
/// ```no_run
/// use duogate_core::{CardCode, Direction};
/// use duogate_network::{AccessBackend, BackendConfig, HttpBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = HttpBackend::new(BackendConfig {
///     endpoint: "http://10.0.0.5:8080/gate".to_string(),
///     ..BackendConfig::default()
/// })?;
///
/// let code = CardCode::new("1234")?;
/// if backend.authorize(&code, Direction::In).await?.is_granted() {
///     backend.notify_passage(&code, Direction::In).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: Url,
    config: Arc<BackendConfig>,
}

impl HttpBackend {
    /// Build the backend and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidEndpoint`] if the endpoint does not
    /// parse as an absolute URL, or [`BackendError::ClientBuild`] if the
    /// client cannot be constructed.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| BackendError::invalid_endpoint(&config.endpoint, e.to_string()))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(BackendError::ClientBuild)?;

        info!(endpoint = %endpoint, "HTTP backend ready");

        Ok(Self {
            client,
            endpoint,
            config: Arc::new(config),
        })
    }

    /// Backend configuration.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn request_url(&self, code: &CardCode, direction: Direction, passed: bool) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair(PARAM_CODE, code.as_str())
                .append_pair(PARAM_DIRECTION, direction.tag());
            if passed {
                query.append_pair(PARAM_PASSED, "1");
            }
            query.append_pair(PARAM_VERBOSE, if self.config.verbose { "1" } else { "0" });
        }
        url
    }

    async fn get(&self, url: Url) -> Result<(StatusCode, String)> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

impl AccessBackend for HttpBackend {
    async fn authorize(
        &self,
        code: &CardCode,
        direction: Direction,
    ) -> Result<AuthorizationOutcome> {
        let url = self.request_url(code, direction, false);
        debug!(%direction, "Requesting authorization");

        let (status, body) = self.get(url).await?;

        if status == StatusCode::OK && body.starts_with(self.config.accept_prefix.as_str()) {
            debug!(%direction, "Authorization granted");
            Ok(AuthorizationOutcome::Granted)
        } else {
            warn!(%direction, status = status.as_u16(), body = %body.trim(), "Authorization denied");
            Ok(AuthorizationOutcome::Denied {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn notify_passage(&self, code: &CardCode, direction: Direction) -> Result<u16> {
        let url = self.request_url(code, direction, true);
        let (status, body) = self.get(url).await?;
        info!(%direction, status = status.as_u16(), body = %body.trim(), "Passage reported");
        Ok(status.as_u16())
    }
}
