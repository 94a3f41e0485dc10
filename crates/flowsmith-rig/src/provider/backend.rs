//! The completion backend seam.

use std::fmt;
use std::sync::Arc;

use flowsmith_core::Result;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

/// Default upper bound on generated tokens.
pub const DEFAULT_MAX_TOKENS: u64 = 1500;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Author of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single message sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    /// Creates a system-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Creates a user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant-role message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// A completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u64,
    pub temperature: f64,
}

impl GenerationRequest {
    /// Creates a request with default sampling parameters.
    pub fn new(messages: Vec<PromptMessage>) -> Self {
        Self {
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Joins the content of every system message, in order.
    pub fn system_instructions(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();

        (!parts.is_empty()).then(|| parts.join("\n\n"))
    }
}

/// A generative text service.
///
/// Implementations return the completion text untouched, or a
/// [`flowsmith_core::Error`] whose kind tells callers whether the failure
/// is worth retrying.
#[async_trait::async_trait]
pub trait CompletionBackend: fmt::Debug + Send + Sync {
    /// Sends one request and returns the completion text.
    async fn generate(&self, request: GenerationRequest) -> Result<String>;

    /// Short provider name, e.g. `openai`.
    fn provider_name(&self) -> &str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

#[async_trait::async_trait]
impl<B: CompletionBackend + ?Sized> CompletionBackend for Arc<B> {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        (**self).generate(request).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
