//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Shared application state.
pub struct AppState {
    /// Client for the upstream conversation API.
    pub upstream: UpstreamClient,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    /// Returns an error if the upstream client cannot be created.
    pub fn new(config: &GatewayConfig) -> Result<Arc<Self>, UpstreamError> {
        let upstream = UpstreamClient::new(config.upstream.clone())?;

        Ok(Arc::new(Self {
            upstream,
            cookie_secure: config.cookie_secure,
        }))
    }
}
