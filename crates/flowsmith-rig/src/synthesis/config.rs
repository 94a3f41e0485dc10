//! Configuration for workflow synthesis.

use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use flowsmith_core::{Error, Result};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::provider::{
    ApiKeyCredentials, CompletionBackend, CompletionProvider, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE, ProviderKind, RetryBackend, RetryPolicy,
};

/// Highest sampling temperature accepted by the supported providers.
pub const MAX_TEMPERATURE: f64 = 2.0;

/// How completion text is turned into JSON.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutputParsing {
    /// Parse the text exactly as returned.
    #[default]
    Direct,
    /// Trim whitespace and a surrounding markdown code fence first.
    StripFences,
}

/// Per-run behavior of the [`Synthesizer`](super::Synthesizer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisOptions {
    pub max_tokens: u64,
    pub temperature: f64,
    pub parsing: OutputParsing,
    /// Run node and connection checks before attaching meta.
    pub validate_structure: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            parsing: OutputParsing::Direct,
            validate_structure: false,
        }
    }
}

impl SynthesisOptions {
    pub fn with_parsing(mut self, parsing: OutputParsing) -> Self {
        self.parsing = parsing;
        self
    }

    pub fn with_structure_validation(mut self, enabled: bool) -> Self {
        self.validate_structure = enabled;
        self
    }
}

/// Completion backend and synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct SynthesisConfig {
    /// Completion provider (`openai` or `anthropic`).
    #[cfg_attr(
        feature = "config",
        arg(long = "llm-provider", env = "LLM_PROVIDER", default_value = "openai")
    )]
    pub provider: ProviderKind,

    /// Model identifier; defaults to the provider's standard model.
    #[cfg_attr(feature = "config", arg(long = "llm-model", env = "LLM_MODEL"))]
    pub model: Option<String>,

    /// API key for the completion provider.
    #[cfg_attr(
        feature = "config",
        arg(long = "llm-api-key", env = "LLM_API_KEY", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub api_key: Option<ApiKeyCredentials>,

    /// Upper bound on generated tokens.
    #[cfg_attr(
        feature = "config",
        arg(long = "llm-max-tokens", env = "LLM_MAX_TOKENS", default_value = "1500")
    )]
    pub max_tokens: u64,

    /// Sampling temperature, 0.0 to 2.0.
    #[cfg_attr(
        feature = "config",
        arg(long = "llm-temperature", env = "LLM_TEMPERATURE", default_value = "0.7")
    )]
    pub temperature: f64,

    /// Retries for rate-limited or unavailable backends; 0 disables retrying.
    #[cfg_attr(
        feature = "config",
        arg(long = "llm-max-retries", env = "LLM_MAX_RETRIES", default_value = "0")
    )]
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds, doubled per retry.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "llm-retry-backoff-ms",
            env = "LLM_RETRY_BACKOFF_MS",
            default_value = "500"
        )
    )]
    pub retry_backoff_ms: u64,

    /// Reject documents with missing nodes, duplicate names or dangling connections.
    #[cfg_attr(feature = "config", arg(long, env = "VALIDATE_STRUCTURE"))]
    pub validate_structure: bool,

    /// Strip a surrounding markdown code fence before parsing.
    #[cfg_attr(feature = "config", arg(long, env = "STRIP_CODE_FENCES"))]
    pub strip_code_fences: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            max_retries: 0,
            retry_backoff_ms: 500,
            validate_structure: false,
            strip_code_fences: false,
        }
    }
}

impl SynthesisConfig {
    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(ApiKeyCredentials::new(api_key));
        self
    }

    /// Returns the configured model, or the provider's default.
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Validates sampling parameters.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `max_tokens` is zero or the
    /// temperature is outside 0.0 to 2.0.
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(Error::configuration().with_message("LLM_MAX_TOKENS must be at least 1"));
        }

        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(Error::configuration().with_message(format!(
                "LLM_TEMPERATURE {} is invalid. Must be between 0.0 and {MAX_TEMPERATURE}.",
                self.temperature
            )));
        }

        Ok(())
    }

    /// Returns the API key, failing when it is absent or blank.
    pub fn credentials(&self) -> Result<&ApiKeyCredentials> {
        self.api_key
            .as_ref()
            .filter(|credentials| !credentials.is_blank())
            .ok_or_else(|| {
                Error::configuration().with_message(
                    "LLM_API_KEY is required. Set it in the environment or pass --llm-api-key.",
                )
            })
    }

    /// Returns the synthesis options derived from this configuration.
    pub fn options(&self) -> SynthesisOptions {
        let parsing = if self.strip_code_fences {
            OutputParsing::StripFences
        } else {
            OutputParsing::Direct
        };

        SynthesisOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            parsing,
            validate_structure: self.validate_structure,
        }
    }

    /// Returns the retry policy for the backend.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_backoff_ms))
    }

    /// Builds the completion backend, wrapped in [`RetryBackend`] when
    /// retries are enabled.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if validation fails, the API key is
    /// missing or the provider client cannot be created.
    pub fn create_backend(&self) -> Result<Arc<dyn CompletionBackend>> {
        self.validate()?;
        let provider =
            CompletionProvider::new(self.provider, self.model_name(), self.credentials()?)?;

        if self.max_retries == 0 {
            return Ok(Arc::new(provider));
        }

        Ok(Arc::new(RetryBackend::new(provider, self.retry_policy())))
    }
}
