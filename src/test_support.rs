//! In-process stand-in for the upstream conversation API.

use axum::extract::{Path, RawQuery};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

/// Serve the fake upstream on an ephemeral port and return its `/v1` base URL.
pub(crate) async fn spawn_upstream() -> String {
    let app = Router::new().route(
        "/v1/conversations/{conversation_id}/variables",
        get(fake_variables),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{addr}/v1")
}

/// Base URL of a port nothing listens on.
pub(crate) async fn unreachable_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/v1")
}

/// Upstream that answers 500 with a body shorter than its `Content-Length`.
pub(crate) async fn truncated_upstream() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind truncated upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0_u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\n{\"mess")
                .await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}/v1")
}

async fn fake_variables(
    Path(conversation_id): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    match conversation_id.as_str() {
        "missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "code": "not_found",
                "message": "Conversation Not Exists.",
                "status": 404
            })),
        )
            .into_response(),
        "broken" => (StatusCode::BAD_GATEWAY, "upstream exploded").into_response(),
        "empty" => Json(json!({ "limit": 20, "has_more": false, "data": [] })).into_response(),
        _ => {
            let authorization = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();

            Json(json!({
                "limit": 20,
                "has_more": false,
                "data": [
                    {
                        "id": "var-1",
                        "name": "city",
                        "value_type": "string",
                        "value": "Paris <FR>",
                        "description": "Where the user lives",
                        "created_at": 1_700_000_000,
                        "updated_at": 1_700_000_100
                    },
                    {
                        "id": "var-2",
                        "name": "age",
                        "value_type": "number",
                        "value": 42
                    }
                ],
                "echo": {
                    "conversation_id": conversation_id,
                    "authorization": authorization,
                    "query": query.unwrap_or_default()
                }
            }))
            .into_response()
        }
    }
}
