//! Completion backends.
//!
//! [`CompletionBackend`] is the seam between the synthesizer and the
//! generative model. Three implementations ship with the crate:
//!
//! - [`CompletionProvider`]: OpenAI or Anthropic through rig.
//! - [`MockBackend`]: scripted replies with a call counter.
//! - [`RetryBackend`]: bounded exponential backoff around another backend.

mod backend;
mod completion;
mod credentials;
mod mock;
mod retry;

pub use backend::{
    CompletionBackend, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GenerationRequest, MessageRole,
    PromptMessage,
};
pub use completion::{CompletionProvider, KICKOFF_PROMPT, ProviderKind};
pub use credentials::ApiKeyCredentials;
pub use mock::{MockBackend, MockReply};
pub use retry::{RetryBackend, RetryPolicy};
