//! The workflow synthesizer.

use std::sync::Arc;

use flowsmith_core::text::{strip_code_fences, truncate_raw_content};
use flowsmith_core::workflow::{
    WorkflowDocument, WorkflowMeta, WorkflowRequest, validate_structure,
};
use serde_json::Value;

use super::config::{OutputParsing, SynthesisConfig, SynthesisOptions};
use super::stage::SynthesisStage;
use crate::error::{Result, SynthesisError};
use crate::prompt::PromptComposer;
use crate::provider::{CompletionBackend, GenerationRequest, PromptMessage};

/// Tracing target for synthesis runs.
const TRACING_TARGET: &str = "flowsmith_rig::synthesis";

/// Turns natural-language descriptions into workflow documents.
///
/// Cheap to clone: all clones share the backend, composer and options.
/// Each [`synthesize`](Self::synthesize) call is independent and makes at
/// most one backend call.
#[derive(Clone)]
pub struct Synthesizer {
    inner: Arc<SynthesizerInner>,
}

struct SynthesizerInner {
    backend: Arc<dyn CompletionBackend>,
    composer: PromptComposer,
    options: SynthesisOptions,
}

impl Synthesizer {
    /// Creates a synthesizer with the default prompt template.
    pub fn new(backend: Arc<dyn CompletionBackend>, options: SynthesisOptions) -> Self {
        Self::with_composer(backend, PromptComposer::default(), options)
    }

    /// Creates a synthesizer with a custom prompt composer.
    pub fn with_composer(
        backend: Arc<dyn CompletionBackend>,
        composer: PromptComposer,
        options: SynthesisOptions,
    ) -> Self {
        Self {
            inner: Arc::new(SynthesizerInner {
                backend,
                composer,
                options,
            }),
        }
    }

    /// Creates a synthesizer from validated configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the API key is missing.
    pub fn from_config(config: &SynthesisConfig) -> flowsmith_core::Result<Self> {
        let backend = config.create_backend()?;
        Ok(Self::new(backend, config.options()))
    }

    pub fn options(&self) -> &SynthesisOptions {
        &self.inner.options
    }

    pub fn provider_name(&self) -> &str {
        self.inner.backend.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.inner.backend.model_name()
    }

    /// Generates a workflow document for `description`.
    ///
    /// # Errors
    ///
    /// - [`SynthesisError::InvalidInput`] for blank descriptions, without
    ///   calling the backend.
    /// - [`SynthesisError::GenerationFailure`] when the backend fails.
    /// - [`SynthesisError::MalformedOutput`] when the completion is not a
    ///   JSON object.
    /// - [`SynthesisError::SchemaViolation`] when structural validation is
    ///   enabled and fails.
    #[tracing::instrument(
        skip_all,
        fields(
            provider = %self.provider_name(),
            model = %self.model_name(),
            description_len = description.len(),
        )
    )]
    pub async fn synthesize(&self, description: &str) -> Result<WorkflowDocument> {
        let mut progress = Progress::default();
        let result = self.run(description, &mut progress).await;

        match &result {
            Ok(document) => {
                progress.advance(SynthesisStage::Succeeded);
                let summary = document.summary();
                tracing::info!(
                    target: TRACING_TARGET,
                    node_count = summary.node_count,
                    edge_count = summary.edge_count,
                    "workflow generated"
                );
            }
            Err(err) => {
                progress.advance(SynthesisStage::Failed(err.kind()));
                tracing::warn!(
                    target: TRACING_TARGET,
                    kind = %err.kind(),
                    error = %err,
                    "workflow generation failed"
                );
            }
        }

        result
    }

    async fn run(&self, description: &str, progress: &mut Progress) -> Result<WorkflowDocument> {
        let request =
            WorkflowRequest::new(description).map_err(|_| SynthesisError::InvalidInput)?;

        progress.advance(SynthesisStage::Composing);
        let prompt = self.inner.composer.compose(&request);
        let options = &self.inner.options;
        let generation = GenerationRequest::new(vec![PromptMessage::system(prompt.render())])
            .with_max_tokens(options.max_tokens)
            .with_temperature(options.temperature);

        progress.advance(SynthesisStage::AwaitingGeneration);
        let raw = self
            .inner
            .backend
            .generate(generation)
            .await
            .map_err(|err| SynthesisError::generation(err.message_or_kind()))?;

        progress.advance(SynthesisStage::Parsing);
        let document = parse_document(&raw, options.parsing)?;

        if options.validate_structure {
            validate_structure(&document)
                .map_err(|violations| SynthesisError::SchemaViolation { violations })?;
        }

        let meta = WorkflowMeta::now(request.into_description());
        document
            .with_meta(&meta)
            .map_err(|err| SynthesisError::MalformedOutput {
                message: err.message_or_kind().to_owned(),
                raw_content: truncate_raw_content(&raw),
            })
    }
}

impl std::fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("backend", &self.inner.backend)
            .field("options", &self.inner.options)
            .finish()
    }
}

/// Parses completion text into a document with a single attempt.
///
/// Raw content reported on failure always comes from the untouched text.
fn parse_document(raw: &str, parsing: OutputParsing) -> Result<WorkflowDocument> {
    let text = match parsing {
        OutputParsing::Direct => raw,
        OutputParsing::StripFences => strip_code_fences(raw),
    };

    let malformed = |message: String| SynthesisError::MalformedOutput {
        message,
        raw_content: truncate_raw_content(raw),
    };

    let value: Value = serde_json::from_str(text).map_err(|err| malformed(err.to_string()))?;
    WorkflowDocument::try_from(value).map_err(|err| malformed(err.message_or_kind().to_owned()))
}

/// Tracks and logs stage transitions for one run.
#[derive(Debug, Default)]
struct Progress {
    stage: SynthesisStage,
}

impl Progress {
    fn advance(&mut self, next: SynthesisStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "invalid synthesis transition {} -> {}",
            self.stage,
            next
        );
        tracing::debug!(
            target: TRACING_TARGET,
            from = %self.stage,
            to = %next,
            "synthesis stage"
        );
        self.stage = next;
    }
}
