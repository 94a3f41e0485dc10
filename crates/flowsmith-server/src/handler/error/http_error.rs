//! HTTP error handling with builder pattern for dynamic error responses.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// The error type for HTTP handlers in the server.
///
/// Carries the [`ErrorKind`] that selects the status code and title, plus the
/// optional fields a failed generation reports back to the caller.
#[derive(Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error<'a> {
    kind: ErrorKind,
    message: Option<Cow<'a, str>>,
    details: Option<Cow<'a, str>>,
    raw_content: Option<Cow<'a, str>>,
    violations: Vec<String>,
    description: Option<Cow<'a, str>>,
}

impl Error<'static> {
    /// Creates a new [`Error`] with the specified kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            details: None,
            raw_content: None,
            violations: Vec::new(),
            description: None,
        }
    }
}

impl<'a> Error<'a> {
    /// Replaces the title of the error kind.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// Attaches details about what went wrong.
    #[inline]
    pub fn with_details(self, details: impl Into<Cow<'a, str>>) -> Self {
        Self {
            details: Some(details.into()),
            ..self
        }
    }

    /// Attaches the truncated raw completion text.
    #[inline]
    pub fn with_raw_content(self, raw_content: impl Into<Cow<'a, str>>) -> Self {
        Self {
            raw_content: Some(raw_content.into()),
            ..self
        }
    }

    /// Attaches structural violations.
    #[inline]
    pub fn with_violations(self, violations: Vec<String>) -> Self {
        Self { violations, ..self }
    }

    /// Echoes the request description back in the response.
    #[inline]
    pub fn with_description(self, description: impl Into<Cow<'a, str>>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    #[inline]
    pub fn raw_content(&self) -> Option<&str> {
        self.raw_content.as_deref()
    }

    #[inline]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Converts this error into a static version by cloning all borrowed data.
    pub fn into_static(self) -> Error<'static> {
        Error {
            kind: self.kind,
            message: self.message.map(|m| Cow::Owned(m.into_owned())),
            details: self.details.map(|d| Cow::Owned(d.into_owned())),
            raw_content: self.raw_content.map(|r| Cow::Owned(r.into_owned())),
            violations: self.violations,
            description: self.description.map(|d| Cow::Owned(d.into_owned())),
        }
    }
}

impl Default for Error<'static> {
    #[inline]
    fn default() -> Self {
        Self::new(ErrorKind::default())
    }
}

impl fmt::Debug for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();

        let mut debug_struct = f.debug_struct("Error");
        debug_struct
            .field("kind", &self.kind)
            .field("status", &response.status)
            .field("error", &response.error);

        if let Some(ref message) = self.message {
            debug_struct.field("custom_message", message);
        }

        if let Some(ref details) = self.details {
            debug_struct.field("details", details);
        }

        if !self.violations.is_empty() {
            debug_struct.field("violations", &self.violations.len());
        }

        debug_struct.finish_non_exhaustive()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();
        let title = self.message.as_deref().unwrap_or(&response.error);

        write!(f, "{title} ({})", response.status)?;

        if let Some(ref details) = self.details {
            write!(f, ": {details}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        let mut response = self.kind.response();

        if let Some(message) = self.message {
            response = response.with_error(message);
        }

        if let Some(details) = self.details {
            response = response.with_details(details);
        }

        if let Some(raw_content) = self.raw_content {
            response = response.with_raw_content(raw_content);
        }

        if let Some(description) = self.description {
            response = response.with_description(description);
        }

        response.with_violations(self.violations).into_response()
    }
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Every way a request can fail, grouped by status code family.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // 4xx Client Errors
    /// 400 Bad Request - Unreadable request body or query
    BadRequest,
    /// 400 Bad Request - Blank or missing description
    MissingDescription,
    /// 404 Not Found - Unknown route
    NotFound,
    /// 405 Method Not Allowed - Generation endpoint called without POST
    MethodNotAllowed,
    /// 413 Payload Too Large - Body over the configured limit
    PayloadTooLarge,

    // 5xx Server Errors
    /// 500 - The completion backend failed
    GenerationFailed,
    /// 500 - The completion was not a JSON object
    MalformedOutput,
    /// 500 - The document failed structural validation
    SchemaViolation,
    /// 500 - Unexpected server error
    #[default]
    InternalServerError,
}

impl ErrorKind {
    /// Converts this error kind into a full [`Error`].
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_message(message)
    }

    #[inline]
    pub fn with_details<'a>(self, details: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_details(details)
    }

    /// Returns the HTTP status code for this error kind.
    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the response template of this error kind.
    #[inline]
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::MissingDescription => ErrorResponse::MISSING_DESCRIPTION,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::MethodNotAllowed => ErrorResponse::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => ErrorResponse::PAYLOAD_TOO_LARGE,
            Self::GenerationFailed => ErrorResponse::GENERATION_FAILED,
            Self::MalformedOutput => ErrorResponse::MALFORMED_OUTPUT,
            Self::SchemaViolation => ErrorResponse::SCHEMA_VIOLATION,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.response().error)
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_http_error() {
        let error = Error::default();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ErrorKind::MissingDescription.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorKind::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorKind::SchemaViolation.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display_prefers_custom_message() {
        let error = ErrorKind::BadRequest
            .with_message("Invalid JSON syntax in request body")
            .with_details("EOF while parsing");
        assert_eq!(
            error.to_string(),
            "Invalid JSON syntax in request body (400 Bad Request): EOF while parsing"
        );
        assert_eq!(ErrorKind::NotFound.to_string(), "Not found");
    }

    #[test]
    fn builder_keeps_fields() {
        let error = ErrorKind::MalformedOutput
            .with_details("expected value")
            .with_raw_content("not json")
            .with_description("daily report");

        assert_eq!(error.details(), Some("expected value"));
        assert_eq!(error.raw_content(), Some("not json"));
        assert_eq!(error.description(), Some("daily report"));
        assert!(error.violations().is_empty());
    }
}
