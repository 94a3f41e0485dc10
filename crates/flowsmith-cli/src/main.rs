#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod server;
mod telemetry;

use std::process;

use anyhow::Context;
use axum::Router;
use flowsmith_server::handler::routes;
use flowsmith_server::middleware::{RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt};
use flowsmith_server::service::ServiceState;

use crate::command::Output;
use crate::config::{Cli, Command, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "flowsmith_cli::server::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "flowsmith_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "flowsmith_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    cli.log();
    cli.validate()?;

    match cli.selected_command() {
        Command::Serve => {
            tracing::info!(
                target: TRACING_TARGET_STARTUP,
                version = env!("CARGO_PKG_VERSION"),
                "starting flowsmith server"
            );

            let state = ServiceState::from_config(&cli.service)
                .context("failed to create service state")?;
            let router = create_router(state, &cli.middleware);

            server::serve(router, cli.server).await?;
        }
        Command::Generate(args) => {
            if let Output::File(path) = command::generate(&cli.service, &args).await? {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - CORS, body limit, security headers
/// 4. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_state(state)
        .with_security(&middleware.cors, &middleware.limits)
        .with_observability()
        .with_recovery(&middleware.recovery)
}
