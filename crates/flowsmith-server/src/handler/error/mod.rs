//! [`Error`], [`ErrorKind`] and [`Result`].

mod http_error;
mod synthesis_error;

pub use http_error::{Error, ErrorKind, Result};
