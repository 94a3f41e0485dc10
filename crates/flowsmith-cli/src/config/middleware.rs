//! Middleware configuration for the HTTP server.
//!
//! ```bash
//! flowsmith --allowed-origins "https://example.com" --request-timeout 60
//! ```

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use flowsmith_server::middleware::{BodyLimitConfig, CorsConfig, RecoveryConfig};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Middleware configuration combining CORS, body limits and recovery settings.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    #[clap(flatten)]
    pub cors: CorsConfig,

    #[clap(flatten)]
    pub limits: BodyLimitConfig,

    /// Request timeout and panic recovery.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Validates timeouts and limits.
    ///
    /// # Errors
    ///
    /// Returns an error when the request timeout or the body limit is zero.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.recovery.request_timeout == 0 {
            return Err(anyhow!("Request timeout must be at least 1 second."));
        }

        if self.limits.max_body_size == 0 {
            return Err(anyhow!("Maximum body size must be at least 1 byte."));
        }

        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?self.cors.allowed_origins,
            credentials = self.cors.allow_credentials,
            max_age_secs = self.cors.max_age_seconds,
            "CORS configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            max_body_size = self.limits.max_body_size,
            "Recovery configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(MiddlewareConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_limits() {
        let mut config = MiddlewareConfig::default();
        config.recovery.request_timeout = 0;
        assert!(config.validate().is_err());

        let mut config = MiddlewareConfig::default();
        config.limits.max_body_size = 0;
        assert!(config.validate().is_err());
    }
}
