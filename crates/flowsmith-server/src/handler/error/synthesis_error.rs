//! Conversion of synthesis failures into HTTP errors.

use flowsmith_rig::SynthesisError;

use super::{Error, ErrorKind};

impl From<SynthesisError> for Error<'static> {
    fn from(error: SynthesisError) -> Self {
        let details = error.details();

        let error = match error {
            SynthesisError::InvalidInput => return ErrorKind::MissingDescription.into_error(),
            SynthesisError::GenerationFailure { .. } => ErrorKind::GenerationFailed.into_error(),
            SynthesisError::MalformedOutput { raw_content, .. } => ErrorKind::MalformedOutput
                .into_error()
                .with_raw_content(raw_content),
            SynthesisError::SchemaViolation { violations } => ErrorKind::SchemaViolation
                .into_error()
                .with_violations(violations.iter().map(ToString::to_string).collect()),
        };

        match details {
            Some(details) => error.with_details(details),
            None => error,
        }
    }
}
