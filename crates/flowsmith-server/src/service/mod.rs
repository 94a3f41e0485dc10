//! Application state and dependency injection.

mod config;
mod export;

use flowsmith_rig::Synthesizer;

pub use crate::service::config::ServiceConfig;
pub use crate::service::export::WorkflowExport;
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    synthesizer: Synthesizer,
    export: WorkflowExport,
}

impl ServiceState {
    /// Creates state around an existing synthesizer with default export naming.
    pub fn new(synthesizer: Synthesizer) -> Self {
        Self {
            synthesizer,
            export: WorkflowExport::default(),
        }
    }

    /// Builds the backend and synthesizer from configuration.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid or the API key is missing.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        let backend = config.create_backend()?;

        Ok(Self {
            synthesizer: Synthesizer::new(backend, config.synthesis.options()),
            export: config.export(),
        })
    }

    pub fn with_export(mut self, export: WorkflowExport) -> Self {
        self.export = export;
        self
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(synthesizer: Synthesizer);
impl_di!(export: WorkflowExport);
