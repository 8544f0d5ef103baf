//! HTTP-facing errors for the gateway routes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::upstream::UpstreamError;

/// JSON error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// HTTP status code, repeated in the body.
    pub status: u16,
}

/// An error returned to gateway callers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// A 400 error for missing or invalid input.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Message shown to the caller.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(status = self.status.as_u16(), "Request failed: {}", self.message);

        let body = ErrorResponse {
            status: self.status.as_u16(),
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
