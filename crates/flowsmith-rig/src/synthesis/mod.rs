//! Workflow synthesis: compose, generate, parse, validate, attach meta.

mod config;
mod stage;
mod synthesizer;

pub use config::{MAX_TEMPERATURE, OutputParsing, SynthesisConfig, SynthesisOptions};
pub use stage::SynthesisStage;
pub use synthesizer::Synthesizer;
