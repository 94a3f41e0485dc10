//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── command: Command               # serve (default) or generate
//! ├── server: ServerConfig           # Host, port, shutdown
//! ├── middleware: MiddlewareConfig   # CORS, body limit, request timeout
//! └── service: ServiceConfig         # Provider, model, sampling, mock mode
//! ```
//!
//! All configuration can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.

mod middleware;
mod server;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use flowsmith_server::service::ServiceConfig;
pub use middleware::MiddlewareConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "flowsmith")]
#[command(about = "Generate n8n workflows from natural-language descriptions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, body limit, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Completion provider and synthesis configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,
}

/// What the binary does once configured.
#[derive(Debug, Clone, Default, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Serve the HTTP API.
    #[default]
    Serve,
    /// Generate a single workflow and exit.
    Generate(GenerateArgs),
}

/// Arguments of `flowsmith generate`.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct GenerateArgs {
    /// Natural-language description of the automation.
    #[arg(short, long)]
    pub description: String,

    /// Directory the workflow file is written to.
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File name prefix; defaults to the export prefix of the service.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Print the workflow to stdout instead of writing a file.
    #[arg(long, conflicts_with = "prefix")]
    pub stdout: bool,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is read before parsing so clap's `env` fallbacks see it.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Returns the selected command, `serve` when none was given.
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }

    /// Validates the configuration the selected command needs.
    pub fn validate(&self) -> anyhow::Result<()> {
        if matches!(self.selected_command(), Command::Serve) {
            self.server
                .validate()
                .context("invalid server configuration")?;
            self.middleware
                .validate()
                .context("invalid middleware configuration")?;
        }

        self.service
            .validate()
            .context("invalid service configuration")?;

        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();

        if matches!(self.selected_command(), Command::Serve) {
            self.server.log();
            self.middleware.log();
        }

        let synthesis = &self.service.synthesis;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            provider = %synthesis.provider,
            model = %synthesis.model_name(),
            max_tokens = synthesis.max_tokens,
            temperature = synthesis.temperature,
            max_retries = synthesis.max_retries,
            validate_structure = synthesis.validate_structure,
            strip_code_fences = synthesis.strip_code_fences,
            offline = self.service.is_offline(),
            "Synthesis configuration"
        );
    }

    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["flowsmith", "--port", "8080"]).unwrap();
        assert!(matches!(cli.selected_command(), Command::Serve));
        assert_eq!(cli.server.port, 8080);
    }

    #[test]
    fn parses_generate_with_shared_options() {
        let cli = Cli::try_parse_from([
            "flowsmith",
            "--mock-response",
            "{}",
            "--validate-structure",
            "generate",
            "--description",
            "Send a daily digest",
            "--stdout",
        ])
        .unwrap();

        let Command::Generate(args) = cli.selected_command() else {
            panic!("expected generate command");
        };
        assert_eq!(args.description, "Send a daily digest");
        assert!(args.stdout);
        assert!(cli.service.is_offline());
        assert!(cli.service.synthesis.validate_structure);
    }

    #[test]
    fn generate_requires_description() {
        assert!(Cli::try_parse_from(["flowsmith", "generate"]).is_err());
    }

    #[test]
    fn generate_skips_server_validation() {
        let cli = Cli::try_parse_from([
            "flowsmith",
            "--port",
            "80",
            "--mock-response",
            "{}",
            "generate",
            "-d",
            "Anything",
        ])
        .unwrap();
        assert!(cli.validate().is_ok());

        let cli = Cli::try_parse_from(["flowsmith", "--port", "80"]).unwrap();
        assert!(cli.validate().is_err());
    }
}
