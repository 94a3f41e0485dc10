use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body of every failed request.
///
/// `error` is always present; the remaining fields are only serialized when
/// the failure carries them.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse<'a> {
    /// Short, caller-facing failure title.
    pub error: Cow<'a, str>,
    /// Parser, backend or validation detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Cow<'a, str>>,
    /// Truncated raw completion text for unparseable output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<Cow<'a, str>>,
    /// Structural violations, one per entry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
    /// Description echoed back from the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Cow<'a, str>>,
    /// HTTP status code (not serialized in JSON)
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new("Invalid request", StatusCode::BAD_REQUEST);
    pub const METHOD_NOT_ALLOWED: Self =
        Self::new("Method not allowed", StatusCode::METHOD_NOT_ALLOWED);
    pub const MISSING_DESCRIPTION: Self =
        Self::new("Description is required", StatusCode::BAD_REQUEST);
    pub const NOT_FOUND: Self = Self::new("Not found", StatusCode::NOT_FOUND);
    pub const PAYLOAD_TOO_LARGE: Self =
        Self::new("Request body too large", StatusCode::PAYLOAD_TOO_LARGE);

    // 5xx Server Errors
    pub const GENERATION_FAILED: Self = Self::new(
        "Failed to generate workflow",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const INTERNAL_SERVER_ERROR: Self =
        Self::new("Internal server error", StatusCode::INTERNAL_SERVER_ERROR);
    pub const MALFORMED_OUTPUT: Self = Self::new(
        "Failed to generate valid workflow JSON",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const SCHEMA_VIOLATION: Self = Self::new(
        "Generated workflow failed structural validation",
        StatusCode::INTERNAL_SERVER_ERROR,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(error: &'a str, status: StatusCode) -> Self {
        Self {
            error: Cow::Borrowed(error),
            details: None,
            raw_content: None,
            violations: Vec::new(),
            description: None,
            status,
        }
    }

    /// Replaces the failure title.
    pub fn with_error(mut self, error: impl Into<Cow<'a, str>>) -> Self {
        self.error = error.into();
        self
    }

    /// Attaches details. Existing details are kept, separated by `; `.
    pub fn with_details(mut self, details: impl Into<Cow<'a, str>>) -> Self {
        let details = details.into();
        self.details = Some(match self.details {
            Some(existing) => Cow::Owned(format!("{existing}; {details}")),
            None => details,
        });
        self
    }

    pub fn with_raw_content(mut self, raw_content: impl Into<Cow<'a, str>>) -> Self {
        self.raw_content = Some(raw_content.into());
        self
    }

    pub fn with_violations(mut self, violations: Vec<String>) -> Self {
        self.violations = violations;
        self
    }

    pub fn with_description(mut self, description: impl Into<Cow<'a, str>>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
