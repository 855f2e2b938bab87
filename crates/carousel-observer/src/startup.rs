//! Host API startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] binds the port on the caller's task, so a taken port
//! is reported before the tick loop starts, then serves on a background
//! Tokio task.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the host API server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Bind the host API server and run it on a background task.
///
/// The returned [`JoinHandle`] completes after `shutdown` resolves and
/// in-flight requests drain.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address cannot be bound.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<()>, StartupError> {
    let listener = server::bind(config).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state, shutdown).await {
            tracing::error!(error = %e, "Host API server exited with error");
        }
    });

    tracing::info!(host = %config.host, port = config.port, "Host API server spawned on background task");

    Ok(handle)
}
