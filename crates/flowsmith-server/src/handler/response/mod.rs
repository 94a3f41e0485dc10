//! Response bodies returned by the handlers.

mod error_response;
mod workflows;

pub use error_response::ErrorResponse;
pub use workflows::GeneratedWorkflow;
