//! HTTP route handlers for the conversation variables gateway.

use std::sync::Arc;

use axum::extract::{Path, RawQuery, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::panel::{self, PanelState};

use super::error::ApiError;
use super::params::VariablesParams;
use super::session;
use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/conversations/{conversation_id}/variables",
            get(conversation_variables),
        )
        .route(
            "/panel/conversations/{conversation_id}/variables",
            get(variables_page),
        )
        .route(
            "/panel/conversations/{conversation_id}/variables/fragment",
            get(variables_fragment),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "convars-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Proxy `GET /conversations/{id}/variables` to the upstream API.
async fn conversation_variables(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let query = VariablesParams::from_query(raw_query.as_deref()).validate(&conversation_id)?;
    let session_id = session::resolve_session_id(&headers);

    let data = state
        .upstream
        .get_conversation_variables(&conversation_id, &query)
        .await?;

    let mut response = Json(data).into_response();
    match session::session_cookie(&session_id, state.cookie_secure) {
        Ok(cookie) => {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        Err(e) => tracing::warn!("Skipping session cookie: {e}"),
    }

    Ok(response)
}

/// Full HTML page: loading panel that swaps in the fragment route.
async fn variables_page(
    Path(conversation_id): Path<String>,
    RawQuery(raw_query): RawQuery,
    uri: Uri,
) -> Response {
    if let Err(e) = VariablesParams::from_query(raw_query.as_deref()).validate(&conversation_id) {
        return failed_panel(&e);
    }

    let fragment_url = match uri.query() {
        Some(q) => format!("{}/fragment?{q}", uri.path()),
        None => format!("{}/fragment", uri.path()),
    };

    Html(panel::render_page(&conversation_id, &fragment_url)).into_response()
}

/// Rendered panel fragment for one conversation.
async fn variables_fragment(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let query = match VariablesParams::from_query(raw_query.as_deref()).validate(&conversation_id) {
        Ok(query) => query,
        Err(e) => return failed_panel(&e),
    };

    match state.upstream.list_variables(&conversation_id, &query).await {
        Ok(page) => Html(panel::render_panel(PanelState::Ready(Some(page.data.as_slice())))).into_response(),
        Err(e) => failed_panel(&ApiError::from(e)),
    }
}

fn failed_panel(err: &ApiError) -> Response {
    tracing::error!(status = err.status().as_u16(), "Panel request failed: {}", err.message());
    (
        err.status(),
        Html(panel::render_panel(PanelState::Failed(err.message()))),
    )
        .into_response()
}
