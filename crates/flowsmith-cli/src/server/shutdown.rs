//! Shutdown signals.

use std::future::pending;

use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::TRACING_TARGET_SHUTDOWN;

/// Resolves on the first Ctrl+C or SIGTERM.
///
/// A signal whose handler cannot be installed is logged and never fires, so
/// the other one still stops the server.
pub async fn shutdown_signal() {
    let interrupt = async {
        match ctrl_c().await {
            Ok(()) => tracing::info!(
                target: TRACING_TARGET_SHUTDOWN,
                signal = "SIGINT",
                "Draining connections"
            ),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_SHUTDOWN,
                    signal = "SIGINT",
                    error = %error,
                    "Signal listener unavailable"
                );
                pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(listener) => listener,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_SHUTDOWN,
                    signal = "SIGTERM",
                    error = %error,
                    "Signal listener unavailable"
                );
                return pending::<()>().await;
            }
        };

        terminate.recv().await;
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            signal = "SIGTERM",
            "Draining connections"
        );
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}
