#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
pub mod prompt;
pub mod provider;
pub mod synthesis;

pub use error::{FailureKind, SynthesisError};
pub use prompt::{GenerationPrompt, PromptComposer};
pub use synthesis::{OutputParsing, SynthesisConfig, SynthesisOptions, SynthesisStage, Synthesizer};

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "flowsmith_rig";
