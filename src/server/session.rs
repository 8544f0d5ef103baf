//! `session_id` cookie handling.

use axum::http::header::{COOKIE, InvalidHeaderValue};
use axum::http::{HeaderMap, HeaderValue};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session_id";

/// Read the session id sent by the browser, if any.
#[must_use]
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Reuse the caller's session id or mint a new one.
#[must_use]
pub fn resolve_session_id(headers: &HeaderMap) -> String {
    session_id_from_headers(headers).unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Build the `Set-Cookie` value for `session_id`.
///
/// # Errors
/// Returns an error if `session_id` cannot appear in a header.
pub fn session_cookie(session_id: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
