//! rig-backed completion provider.

use std::sync::Arc;

use flowsmith_core::{Error, ErrorKind, Result};
use rig::completion::{AssistantContent, CompletionError, CompletionModel as RigCompletionModel};
use rig::message::Message;
use rig::one_or_many::OneOrMany;
use rig::prelude::CompletionClient;
use rig::providers::{anthropic, openai};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use super::backend::{CompletionBackend, GenerationRequest, MessageRole};
use super::credentials::ApiKeyCredentials;

/// Tracing target for provider calls.
const TRACING_TARGET: &str = "flowsmith_rig::provider";

/// User turn sent when a request carries only system instructions.
pub const KICKOFF_PROMPT: &str = "Generate the workflow JSON now.";

/// Supported completion providers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    /// OpenAI chat completions.
    #[default]
    OpenAi,
    /// Anthropic messages.
    Anthropic,
}

impl ProviderKind {
    /// Model used when none is configured.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4",
            Self::Anthropic => "claude-sonnet-4-20250514",
        }
    }
}

/// Completion provider that wraps the rig model for the configured vendor.
///
/// This is a cheaply cloneable wrapper around an `Arc<CompletionService>`.
#[derive(Clone)]
pub struct CompletionProvider(Arc<CompletionService>);

enum CompletionService {
    OpenAi {
        model: openai::CompletionModel,
        model_name: String,
    },
    Anthropic {
        model: anthropic::completion::CompletionModel,
        model_name: String,
    },
}

/// A [`GenerationRequest`] split into the parts rig's request builder takes.
struct RigRequest {
    preamble: Option<String>,
    history: Vec<Message>,
    prompt: Message,
    max_tokens: u64,
    temperature: f64,
}

impl RigRequest {
    /// System messages become the preamble; the last user message becomes
    /// the prompt and everything in between the chat history.
    fn from_generation(request: GenerationRequest) -> Self {
        let preamble = request.system_instructions();

        let mut history: Vec<Message> = request
            .messages
            .into_iter()
            .filter_map(|message| match message.role {
                MessageRole::System => None,
                MessageRole::User => Some(Message::user(message.content)),
                MessageRole::Assistant => Some(Message::assistant(message.content)),
            })
            .collect();

        let ends_with_user = matches!(history.last(), Some(Message::User { .. }));
        let prompt = ends_with_user
            .then(|| history.pop())
            .flatten()
            .unwrap_or_else(|| Message::user(KICKOFF_PROMPT));

        Self {
            preamble,
            history,
            prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn send<M: RigCompletionModel>(
        self,
        model: &M,
    ) -> std::result::Result<String, CompletionError> {
        let mut builder = model
            .completion_request(self.prompt)
            .messages(self.history)
            .max_tokens(self.max_tokens)
            .temperature(self.temperature);

        if let Some(preamble) = self.preamble {
            builder = builder.preamble(preamble);
        }

        let response = builder.send().await?;
        Ok(extract_text_content(&response.choice))
    }
}

impl CompletionProvider {
    /// Creates a provider for `kind` serving `model`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key is blank or the rig client
    /// cannot be built.
    pub fn new(kind: ProviderKind, model: &str, credentials: &ApiKeyCredentials) -> Result<Self> {
        if credentials.is_blank() {
            return Err(Error::configuration().with_message("LLM_API_KEY must not be empty"));
        }

        let model_name = model.to_owned();
        let inner = match kind {
            ProviderKind::OpenAi => {
                let client = openai::Client::new(credentials.api_key())
                    .map_err(|e| client_error(kind, e))?
                    .completions_api();
                CompletionService::OpenAi {
                    model: client.completion_model(model),
                    model_name,
                }
            }
            ProviderKind::Anthropic => {
                let client = anthropic::Client::new(credentials.api_key())
                    .map_err(|e| client_error(kind, e))?;
                CompletionService::Anthropic {
                    model: client.completion_model(model),
                    model_name,
                }
            }
        };

        Ok(Self(Arc::new(inner)))
    }

    /// Creates an OpenAI provider.
    pub fn openai(model: &str, credentials: &ApiKeyCredentials) -> Result<Self> {
        Self::new(ProviderKind::OpenAi, model, credentials)
    }

    /// Creates an Anthropic provider.
    pub fn anthropic(model: &str, credentials: &ApiKeyCredentials) -> Result<Self> {
        Self::new(ProviderKind::Anthropic, model, credentials)
    }

    /// Returns the provider kind.
    pub fn kind(&self) -> ProviderKind {
        match self.0.as_ref() {
            CompletionService::OpenAi { .. } => ProviderKind::OpenAi,
            CompletionService::Anthropic { .. } => ProviderKind::Anthropic,
        }
    }
}

#[async_trait::async_trait]
impl CompletionBackend for CompletionProvider {
    #[tracing::instrument(skip_all, fields(provider = %self.kind(), model = %self.model_name()))]
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let request = RigRequest::from_generation(request);
        tracing::debug!(
            target: TRACING_TARGET,
            history_len = request.history.len(),
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "sending completion request"
        );

        let result = match self.0.as_ref() {
            CompletionService::OpenAi { model, .. } => request.send(model).await,
            CompletionService::Anthropic { model, .. } => request.send(model).await,
        };

        match result {
            Ok(text) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    response_len = text.len(),
                    "completion received"
                );
                Ok(text)
            }
            Err(err) => {
                let error = completion_error(self.kind(), err);
                tracing::warn!(
                    target: TRACING_TARGET,
                    kind = error.kind_str(),
                    error = %error,
                    "completion request failed"
                );
                Err(error)
            }
        }
    }

    fn provider_name(&self) -> &str {
        self.kind().into()
    }

    fn model_name(&self) -> &str {
        match self.0.as_ref() {
            CompletionService::OpenAi { model_name, .. } => model_name,
            CompletionService::Anthropic { model_name, .. } => model_name,
        }
    }
}

impl std::fmt::Debug for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionProvider")
            .field("provider", &self.kind())
            .field("model", &self.model_name())
            .finish()
    }
}

/// Extracts text content from assistant content choices.
fn extract_text_content(choice: &OneOrMany<AssistantContent>) -> String {
    choice
        .iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

fn client_error(kind: ProviderKind, err: impl std::fmt::Display) -> Error {
    Error::configuration().with_message(format!("failed to create {kind} client: {err}"))
}

/// Maps a rig error onto an [`ErrorKind`] so retry wrappers can classify it.
fn completion_error(kind: ProviderKind, err: CompletionError) -> Error {
    let message = err.to_string();
    let error_kind = match &err {
        CompletionError::HttpError(_) if is_timeout(&message) => ErrorKind::Timeout,
        CompletionError::HttpError(_) => ErrorKind::NetworkError,
        CompletionError::ProviderError(detail) => classify_provider_message(detail),
        _ => ErrorKind::ExternalError,
    };

    Error::new(error_kind).with_message(format!("{kind}: {message}"))
}

fn is_timeout(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("timed out") || message.contains("timeout")
}

fn classify_provider_message(detail: &str) -> ErrorKind {
    let lower = detail.to_ascii_lowercase();
    if lower.contains("rate limit") || lower.contains("rate_limit") || lower.contains("429") {
        ErrorKind::RateLimited
    } else if lower.contains("504") || is_timeout(&lower) {
        ErrorKind::Timeout
    } else if lower.contains("overloaded")
        || lower.contains("503")
        || lower.contains("unavailable")
    {
        ErrorKind::ServiceUnavailable
    } else if lower.contains("401")
        || lower.contains("invalid api key")
        || lower.contains("invalid_api_key")
        || lower.contains("authentication")
    {
        ErrorKind::Authentication
    } else {
        ErrorKind::ExternalError
    }
}

#[cfg(test)]
mod tests {
    use super::super::backend::PromptMessage;
    use super::*;

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(
            "Anthropic".parse::<ProviderKind>().unwrap(),
            ProviderKind::Anthropic
        );
        assert!("cohere".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
        assert_eq!(ProviderKind::default().default_model(), "gpt-4");
    }

    #[test]
    fn system_only_request_gets_kickoff_turn() {
        let request = RigRequest::from_generation(GenerationRequest::new(vec![
            PromptMessage::system("Build a workflow."),
        ]));

        assert_eq!(request.preamble.as_deref(), Some("Build a workflow."));
        assert!(request.history.is_empty());
        assert_eq!(request.prompt, Message::user(KICKOFF_PROMPT));
    }

    #[test]
    fn trailing_user_turn_becomes_prompt() {
        let request = RigRequest::from_generation(
            GenerationRequest::new(vec![
                PromptMessage::system("rules"),
                PromptMessage::user("first"),
                PromptMessage::assistant("{}"),
                PromptMessage::user("again"),
            ])
            .with_max_tokens(64)
            .with_temperature(0.0),
        );

        assert_eq!(request.history.len(), 2);
        assert_eq!(request.prompt, Message::user("again"));
        assert_eq!(request.max_tokens, 64);
        assert_eq!(request.temperature, 0.0);
    }

    #[test]
    fn blank_key_is_rejected() {
        let error = CompletionProvider::openai("gpt-4", &ApiKeyCredentials::new(""))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn provider_messages_are_classified() {
        assert_eq!(
            classify_provider_message("429 Too Many Requests: Rate limit reached"),
            ErrorKind::RateLimited
        );
        assert_eq!(
            classify_provider_message("Overloaded"),
            ErrorKind::ServiceUnavailable
        );
        assert_eq!(
            classify_provider_message("Incorrect API key provided: invalid_api_key"),
            ErrorKind::Authentication
        );
        assert_eq!(
            classify_provider_message("context length exceeded"),
            ErrorKind::ExternalError
        );
    }

    #[test]
    fn timeouts_are_retryable() {
        assert_eq!(
            classify_provider_message("504 Gateway Timeout"),
            ErrorKind::Timeout
        );

        let error = completion_error(
            ProviderKind::OpenAi,
            CompletionError::ProviderError("request timed out after 60s".into()),
        );
        assert_eq!(error.kind(), ErrorKind::Timeout);
        assert!(error.is_retryable());
        assert!(error.message_or_kind().starts_with("openai: "));
    }
}
