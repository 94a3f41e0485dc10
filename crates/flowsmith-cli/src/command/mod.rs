//! One-shot commands that run without the HTTP server.

mod generate;

pub use generate::{Output, generate};
