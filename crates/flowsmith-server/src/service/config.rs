use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use flowsmith_core::workflow::EXPORT_FILE_PREFIX;
use flowsmith_core::{Error, Result};
use flowsmith_rig::SynthesisConfig;
use flowsmith_rig::provider::{CompletionBackend, MockBackend};
use serde::{Deserialize, Serialize};

use crate::service::WorkflowExport;

const TRACING_TARGET: &str = "flowsmith_server::service::config";

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    #[cfg_attr(feature = "config", clap(flatten))]
    pub synthesis: SynthesisConfig,

    /// Answer every generation with this text instead of calling the
    /// provider. No API key is needed in this mode.
    #[cfg_attr(feature = "config", arg(long, env = "MOCK_RESPONSE"))]
    pub mock_response: Option<String>,

    /// File name prefix of downloaded workflows.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "EXPORT_FILE_PREFIX", default_value = EXPORT_FILE_PREFIX)
    )]
    pub export_prefix: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            synthesis: SynthesisConfig::default(),
            mock_response: None,
            export_prefix: EXPORT_FILE_PREFIX.to_owned(),
        }
    }
}

impl ServiceConfig {
    /// Replaces the provider with a [`MockBackend`] answering `text`.
    pub fn with_mock_response(mut self, text: impl Into<String>) -> Self {
        self.mock_response = Some(text.into());
        self
    }

    /// Returns true when generations are served by a [`MockBackend`].
    pub fn is_offline(&self) -> bool {
        self.mock_response.is_some()
    }

    /// Validates the synthesis settings and the export prefix.
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.synthesis.validate()?;
        self.export().validate()
    }

    pub fn export(&self) -> WorkflowExport {
        WorkflowExport::new(self.export_prefix.clone())
    }

    /// Builds the completion backend.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid, or when no mock response is
    /// set and the API key is missing.
    pub fn create_backend(&self) -> Result<Arc<dyn CompletionBackend>> {
        let Some(text) = self.mock_response.as_deref() else {
            return self.synthesis.create_backend();
        };

        self.synthesis.validate()?;
        tracing::warn!(
            target: TRACING_TARGET,
            "serving canned completions, the provider will not be called"
        );

        Ok(Arc::new(MockBackend::new(text)))
    }
}

/// Checks that `prefix` is usable as a file name prefix.
pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    let invalid = prefix.trim().is_empty()
        || prefix
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '"') || c.is_control());

    if invalid {
        return Err(Error::configuration().with_message(format!(
            "Export file prefix {prefix:?} must be non-empty and must not contain path separators or quotes"
        )));
    }

    Ok(())
}
