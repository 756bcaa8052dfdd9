//! Graceful shutdown signal handling.

use std::io;

use thiserror::Error;
use tokio::signal;

/// Errors raised while installing signal handlers.
#[derive(Debug, Error)]
pub enum ShutdownSignalError {
    #[error("failed to install Ctrl+C handler: {0}")]
    CtrlC(#[source] io::Error),

    #[cfg(unix)]
    #[error("failed to install SIGTERM handler: {0}")]
    SigTerm(#[source] io::Error),
}

/// Resolves once SIGINT or (on unix) SIGTERM arrives.
///
/// # Errors
///
/// Returns `ShutdownSignalError` if a handler cannot be installed.
pub async fn signal_received() -> Result<(), ShutdownSignalError> {
    let ctrl_c = async { signal::ctrl_c().await.map_err(ShutdownSignalError::CtrlC) };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(ShutdownSignalError::SigTerm)?
            .recv()
            .await;
        Ok::<(), ShutdownSignalError>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<(), ShutdownSignalError>>();

    tokio::select! {
        result = ctrl_c => {
            result?;
            tracing::info!("ctrl_c signal received");
        }
        result = terminate => {
            result?;
            tracing::info!("terminate signal received");
        }
    }

    Ok(())
}

/// Shutdown future for `axum::serve(..).with_graceful_shutdown`. A handler
/// installation failure is logged and the server keeps running.
pub async fn graceful() {
    if let Err(err) = signal_received().await {
        tracing::error!(error = %err, "shutdown signal handler unavailable");
        std::future::pending::<()>().await;
    }
}
