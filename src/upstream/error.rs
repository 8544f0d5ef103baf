//! Error types for the upstream client.

use thiserror::Error;

/// Errors that can occur while talking to the upstream API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-success status.
    #[error("Dify API Error: {status} {message}")]
    Api {
        /// HTTP status returned by the upstream.
        status: u16,
        /// Message extracted from the error body, or the status reason.
        message: String,
    },

    /// HTTP request failed (connect, timeout, body decoding).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP client configuration error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Base URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body did not have the expected shape.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl UpstreamError {
    /// Status code to surface to gateway callers.
    ///
    /// Upstream API errors keep their status when it is a client or server
    /// error code; everything else maps to 500.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Api { status, .. } if *status >= 400 && *status <= 599 => *status,
            _ => 500,
        }
    }
}
