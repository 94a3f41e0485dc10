//! In-memory backend replaying canned completions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use flowsmith_core::{Error, ErrorKind, Result};

use super::backend::{CompletionBackend, GenerationRequest};

/// One scripted backend reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Completion text returned verbatim.
    Text(String),
    /// A backend failure of the given kind.
    Failure { kind: ErrorKind, message: String },
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    fn to_result(&self) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text.clone()),
            Self::Failure { kind, message } => Err(Error::new(*kind).with_message(message.clone())),
        }
    }
}

/// Backend that answers from a script and counts its calls.
///
/// Replies are consumed in order; the last one repeats once the script
/// runs out.
#[derive(Debug)]
pub struct MockBackend {
    replies: Mutex<VecDeque<MockReply>>,
    last: Mutex<Option<GenerationRequest>>,
    calls: AtomicUsize,
    model_name: String,
}

impl MockBackend {
    /// Model name reported by mock backends.
    pub const MODEL_NAME: &str = "mock";

    /// Creates a backend that always returns `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self::scripted([MockReply::text(text)])
    }

    /// Creates a backend that always fails.
    pub fn failing(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::scripted([MockReply::failure(kind, message)])
    }

    /// Creates a backend replaying `replies` in order.
    pub fn scripted(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            model_name: Self::MODEL_NAME.to_owned(),
        }
    }

    /// Overrides the reported model name.
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        lock(&self.last).clone()
    }

    fn next_reply(&self) -> Result<String> {
        let mut replies = lock(&self.replies);
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };

        match reply {
            Some(reply) => reply.to_result(),
            None => Err(Error::new(ErrorKind::InternalError)
                .with_message("mock backend has no scripted replies")),
        }
    }
}

#[async_trait::async_trait]
impl CompletionBackend for MockBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last) = Some(request);
        self.next_reply()
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::super::backend::PromptMessage;
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest::new(vec![PromptMessage::system("prompt")])
    }

    #[tokio::test]
    async fn repeats_single_reply() {
        let backend = MockBackend::new("{}");

        assert_eq!(backend.generate(request()).await.unwrap(), "{}");
        assert_eq!(backend.generate(request()).await.unwrap(), "{}");
        assert_eq!(backend.calls(), 2);
        assert_eq!(backend.last_request(), Some(request()));
    }

    #[tokio::test]
    async fn replays_script_then_repeats_last() {
        let backend = MockBackend::scripted([
            MockReply::failure(ErrorKind::RateLimited, "slow down"),
            MockReply::text("ok"),
        ]);

        let error = backend.generate(request()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RateLimited);
        assert_eq!(backend.generate(request()).await.unwrap(), "ok");
        assert_eq!(backend.generate(request()).await.unwrap(), "ok");
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn empty_script_fails() {
        let backend = MockBackend::scripted([]);
        assert!(backend.generate(request()).await.is_err());
        assert_eq!(backend.last_request(), Some(request()));
    }
}
