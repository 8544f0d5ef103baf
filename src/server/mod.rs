//! HTTP server for the conversation variables gateway.
//!
//! Provides endpoints for:
//! - Proxying conversation variables from the upstream API
//! - Rendering the variables panel
//! - Health checks

pub mod error;
pub mod params;
pub mod routes;
pub mod session;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Bind `addr` and serve until `shutdown_signal` completes.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    addr: SocketAddr,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, shutdown_signal).await
}

/// Serve the gateway on an already bound listener.
///
/// New connections stop being accepted once `shutdown_signal` completes.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app: Router = create_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Conversation variables gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}
