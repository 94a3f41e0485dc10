//! Synthesis run stages.

use std::fmt;

use crate::error::FailureKind;

/// Where a synthesis run currently is.
///
/// A run moves `Idle → Composing → AwaitingGeneration → Parsing` and ends in
/// `Succeeded` or `Failed`. Input rejection fails straight from `Idle`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisStage {
    #[default]
    Idle,
    Composing,
    AwaitingGeneration,
    Parsing,
    Succeeded,
    Failed(FailureKind),
}

impl SynthesisStage {
    /// Returns true for `Succeeded` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }

    /// Returns true if `next` may follow this stage.
    pub fn can_advance_to(self, next: Self) -> bool {
        use SynthesisStage::*;

        match (self, next) {
            (Idle, Composing) | (Composing, AwaitingGeneration) | (AwaitingGeneration, Parsing) => {
                true
            }
            (Parsing, Succeeded) => true,
            (Idle, Failed(FailureKind::InvalidInput)) => true,
            (AwaitingGeneration, Failed(FailureKind::GenerationFailure)) => true,
            (Parsing, Failed(FailureKind::MalformedOutput | FailureKind::SchemaViolation)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SynthesisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Composing => f.write_str("composing"),
            Self::AwaitingGeneration => f.write_str("awaiting_generation"),
            Self::Parsing => f.write_str("parsing"),
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed(kind) => write!(f, "failed({kind})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let path = [
            SynthesisStage::Idle,
            SynthesisStage::Composing,
            SynthesisStage::AwaitingGeneration,
            SynthesisStage::Parsing,
            SynthesisStage::Succeeded,
        ];

        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(SynthesisStage::Succeeded.is_terminal());
    }

    #[test]
    fn failures_come_from_their_stage() {
        let generation = SynthesisStage::Failed(FailureKind::GenerationFailure);
        assert!(SynthesisStage::AwaitingGeneration.can_advance_to(generation));
        assert!(!SynthesisStage::Parsing.can_advance_to(generation));
        assert!(!SynthesisStage::Succeeded.can_advance_to(SynthesisStage::Parsing));
    }

    #[test]
    fn display() {
        assert_eq!(
            SynthesisStage::Failed(FailureKind::MalformedOutput).to_string(),
            "failed(malformed_output)"
        );
        assert_eq!(SynthesisStage::AwaitingGeneration.to_string(), "awaiting_generation");
    }
}
