//! API server startup helper for embedding in the telemetry service.
//!
//! Provides [`spawn_api`] which binds the listener up front and then
//! serves the HTTP + `WebSocket` API on a background Tokio task, so the
//! service binary can run it alongside the bus bridge.
//!
//! # Usage
//!
//! ```rust,ignore
//! use telemetry_api::startup::spawn_api;
//!
//! let handle = spawn_api(&ServerConfig::from(&config.server), state).await?;
//! // The server is now running. The handle can be awaited on shutdown.
//! ```

use std::sync::Arc;

use telemetry_core::RecordStore;
use tokio::task::JoinHandle;

use crate::router::build_router;
use crate::server::{bind, serve, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the API server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the API server on a background Tokio task.
///
/// The address is bound before the task is spawned, so a port that is
/// already in use is reported here rather than from inside the task.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the server cannot bind to the
/// requested address.
pub async fn spawn_api<S: RecordStore>(
    config: &ServerConfig,
    state: Arc<AppState<S>>,
) -> Result<JoinHandle<()>, StartupError> {
    let listener = bind(config).await?;
    let router = build_router(state, &config.cors_origins);

    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, router).await {
            tracing::error!(error = %e, "Telemetry API exited with error");
        }
    });

    tracing::info!(port = config.port, "Telemetry API spawned on background task");

    Ok(handle)
}
