//! HTTP listener binding and graceful shutdown.

use std::future::IntoFuture;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::lifecycle::serve_with_shutdown;
use super::shutdown::shutdown_signal;
use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP};

/// Binds the configured address and serves `app` until a shutdown signal.
///
/// In-flight requests get `shutdown_timeout` seconds to complete after the
/// signal; connections still open after that are dropped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
/// while running.
pub async fn serve(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let server_addr = server_config.server_addr();

    let listener = match TcpListener::bind(server_addr).await {
        Ok(listener) => {
            tracing::info!(
                target: TRACING_TARGET_STARTUP,
                addr = %server_addr,
                "Successfully bound to address"
            );
            listener
        }
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_STARTUP,
                addr = %server_addr,
                error = %err,
                "Failed to bind to address"
            );
            return Err(ServerError::bind_error(server_addr, err));
        }
    };

    let shutdown_timeout = server_config.shutdown_timeout();
    serve_with_shutdown(&server_config, || {
        serve_until_deadline(listener, app, shutdown_timeout)
    })
    .await
}

async fn serve_until_deadline(
    listener: TcpListener,
    app: Router,
    shutdown_timeout: Duration,
) -> io::Result<()> {
    let signalled = Arc::new(Notify::new());

    let signal = {
        let signalled = Arc::clone(&signalled);
        async move {
            shutdown_signal().await;
            signalled.notify_one();
        }
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .into_future();

    let deadline = async {
        signalled.notified().await;
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            timeout_secs = shutdown_timeout.as_secs(),
            "Waiting for in-flight requests"
        );
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server => result,
        () = deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SHUTDOWN,
                timeout_secs = shutdown_timeout.as_secs(),
                "Shutdown timeout elapsed, dropping open connections"
            );
            Ok(())
        }
    }
}
