//! Error types for workflow synthesis.

use flowsmith_core::workflow::Violation;
use strum::{AsRefStr, Display, IntoStaticStr};

/// Result type alias for synthesis operations.
pub type Result<T> = std::result::Result<T, SynthesisError>;

/// Failures a synthesis run can end in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    /// The description was missing, empty or whitespace-only.
    #[error("Description is required")]
    InvalidInput,

    /// The completion backend failed (network, auth, rate limit, service error).
    #[error("Failed to generate workflow: {message}")]
    GenerationFailure { message: String },

    /// The backend answered, but not with a JSON object.
    #[error("Failed to generate valid workflow JSON: {message}")]
    MalformedOutput {
        /// Parser message.
        message: String,
        /// Leading part of the raw completion, truncated for diagnostics.
        raw_content: String,
    },

    /// The document parsed but failed structural validation.
    #[error("Generated workflow failed structural validation ({} violations)", violations.len())]
    SchemaViolation { violations: Vec<Violation> },
}

impl SynthesisError {
    /// Creates a generation failure.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationFailure {
            message: message.into(),
        }
    }

    /// Returns the failure kind.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput => FailureKind::InvalidInput,
            Self::GenerationFailure { .. } => FailureKind::GenerationFailure,
            Self::MalformedOutput { .. } => FailureKind::MalformedOutput,
            Self::SchemaViolation { .. } => FailureKind::SchemaViolation,
        }
    }

    /// Returns the short, caller-facing title of the failure.
    pub fn title(&self) -> &'static str {
        match self {
            Self::InvalidInput => "Description is required",
            Self::GenerationFailure { .. } => "Failed to generate workflow",
            Self::MalformedOutput { .. } => "Failed to generate valid workflow JSON",
            Self::SchemaViolation { .. } => "Generated workflow failed structural validation",
        }
    }

    /// Returns the underlying failure detail, if any.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::InvalidInput => None,
            Self::GenerationFailure { message } | Self::MalformedOutput { message, .. } => {
                Some(message.clone())
            }
            Self::SchemaViolation { violations } => Some(
                violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        }
    }

    /// Returns the HTTP status code this failure maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            _ => 500,
        }
    }
}

/// Discriminant of [`SynthesisError`], used in stage reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    InvalidInput,
    GenerationFailure,
    MalformedOutput,
    SchemaViolation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(SynthesisError::InvalidInput.status_code(), 400);
        assert_eq!(SynthesisError::generation("boom").status_code(), 500);
        assert_eq!(
            SynthesisError::SchemaViolation { violations: vec![] }.status_code(),
            500
        );
    }

    #[test]
    fn details_join_violations() {
        let error = SynthesisError::SchemaViolation {
            violations: vec![
                Violation {
                    path: "/nodes".into(),
                    message: "must contain at least one node".into(),
                },
                Violation {
                    path: "/connections".into(),
                    message: "is required".into(),
                },
            ],
        };

        assert_eq!(
            error.details().as_deref(),
            Some("/nodes: must contain at least one node; /connections: is required")
        );
        assert_eq!(error.kind().as_ref(), "schema_violation");
    }

    #[test]
    fn titles_match_display_prefix() {
        let error = SynthesisError::MalformedOutput {
            message: "expected value at line 1 column 1".into(),
            raw_content: "not json".into(),
        };

        assert!(error.to_string().starts_with(error.title()));
        assert_eq!(SynthesisError::InvalidInput.details(), None);
    }
}
