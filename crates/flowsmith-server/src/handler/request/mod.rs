//! Request bodies and query parameters accepted by the handlers.

mod workflows;

pub use workflows::{DownloadParams, GenerateWorkflow};
