//! All `axum::`[`Handler`]s with related request and response types.
//!
//! [`Handler`]: axum::handler::Handler

mod error;
mod monitors;
pub mod request;
pub mod response;
mod workflows;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::ErrorResponse;
pub use crate::handler::workflows::GENERATE_WORKFLOW_PATH;
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns every route with the JSON `404` fallback.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(workflows::routes())
        .merge(monitors::routes())
        .fallback(handler)
}
