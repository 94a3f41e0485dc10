//! Server lifecycle logging and uptime tracking.

use std::future::Future;
use std::io;
use std::time::Instant;

use super::ServerError;
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP};

/// Runs the server future, logging readiness and the final outcome.
///
/// # Errors
///
/// Returns [`ServerError::Runtime`] when the server future fails.
pub async fn serve_with_shutdown<F>(
    server_config: &ServerConfig,
    serve_fn: impl FnOnce() -> F,
) -> Result<(), ServerError>
where
    F: Future<Output = io::Result<()>>,
{
    let start_time = Instant::now();

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        addr = %server_config.server_addr(),
        "Server is ready and listening for connections"
    );

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_STARTUP,
            "Server bound to all interfaces, ensure firewall is configured"
        );
    }

    let result = serve_fn().await.map_err(ServerError::Runtime);
    handle_result(result, start_time)
}

fn handle_result(result: Result<(), ServerError>, start_time: Instant) -> Result<(), ServerError> {
    let uptime = start_time.elapsed();

    match result {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SHUTDOWN,
                uptime_secs = uptime.as_secs(),
                "Shutdown completed"
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %err,
                code = err.error_code(),
                recoverable = err.is_recoverable(),
                uptime_secs = uptime.as_secs(),
                "Fatal error"
            );

            if let Some(suggestion) = err.suggestion() {
                tracing::info!(
                    target: TRACING_TARGET_SHUTDOWN,
                    suggestion,
                    "Recovery suggestion"
                );
            }

            Err(err)
        }
    }
}
