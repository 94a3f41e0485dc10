//! Bounded retries with exponential backoff around any backend.

use std::time::Duration;

use flowsmith_core::Result;

use super::backend::{CompletionBackend, GenerationRequest};

const TRACING_TARGET: &str = "flowsmith_rig::provider::retry";

/// Retry policy for [`RetryBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; zero disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further one.
    pub initial_backoff: Duration,
    /// Upper bound for a single delay.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (zero-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }
}

/// Wraps a backend, repeating requests that fail with a retryable error kind.
#[derive(Debug, Clone)]
pub struct RetryBackend<B> {
    inner: B,
    policy: RetryPolicy,
}

impl<B: CompletionBackend> RetryBackend<B> {
    pub fn new(inner: B, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn into_inner(self) -> B {
        self.inner
    }
}

#[async_trait::async_trait]
impl<B: CompletionBackend> CompletionBackend for RetryBackend<B> {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let mut retry = 0;
        loop {
            match self.inner.generate(request.clone()).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && retry < self.policy.max_retries => {
                    let delay = self.policy.backoff(retry);
                    retry += 1;
                    tracing::warn!(
                        target: TRACING_TARGET,
                        retry,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying completion request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use flowsmith_core::ErrorKind;

    use super::super::backend::PromptMessage;
    use super::super::mock::{MockBackend, MockReply};
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest::new(vec![PromptMessage::system("prompt")])
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(100))
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = policy(5);
        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(800));
        assert_eq!(policy.backoff(40), policy.max_backoff);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_retryable_failures() {
        let mock = Arc::new(MockBackend::scripted([
            MockReply::failure(ErrorKind::RateLimited, "slow down"),
            MockReply::failure(ErrorKind::Timeout, "timed out"),
            MockReply::text("{}"),
        ]));
        let backend = RetryBackend::new(mock.clone(), policy(3));

        assert_eq!(backend.generate(request()).await.unwrap(), "{}");
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let mock = Arc::new(MockBackend::failing(ErrorKind::NetworkError, "down"));
        let backend = RetryBackend::new(mock.clone(), policy(2));

        let error = backend.generate(request()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NetworkError);
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_failures() {
        let mock = Arc::new(MockBackend::failing(ErrorKind::Authentication, "bad key"));
        let backend = RetryBackend::new(mock.clone(), policy(5));

        assert!(backend.generate(request()).await.is_err());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn disabled_by_default() {
        let mock = Arc::new(MockBackend::failing(ErrorKind::RateLimited, "slow down"));
        let backend = RetryBackend::new(mock.clone(), RetryPolicy::default());

        assert!(backend.generate(request()).await.is_err());
        assert_eq!(mock.calls(), 1);
    }
}
