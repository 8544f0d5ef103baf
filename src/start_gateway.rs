//! Startup helpers for the conversation variables gateway.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::server::{self, AppState};

/// Run the server (used by the `convars-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting conversation variables gateway v{}", env!("CARGO_PKG_VERSION"));

    let (config, state) = match initialize() {
        Ok(init) => init,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, addr, shutdown_signal())) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Gateway stopped");
    ExitCode::SUCCESS
}

/// Load configuration and build application state without starting the server.
///
/// # Errors
/// Returns an error if the configuration is incomplete or state creation fails.
pub fn initialize() -> Result<(GatewayConfig, Arc<AppState>), Box<dyn std::error::Error + Send + Sync>> {
    let config = GatewayConfig::from_env().map_err(|e| format!("Invalid configuration: {e}"))?;

    tracing::info!("Upstream endpoint: {}", config.upstream.base_url);
    if let Some(app_id) = &config.app_id {
        tracing::info!("Upstream application: {app_id}");
    }

    let state = AppState::new(&config).map_err(|e| format!("Failed to create state: {e}"))?;
    Ok((config, state))
}

/// Resolve once Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
