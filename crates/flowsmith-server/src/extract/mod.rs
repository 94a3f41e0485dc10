//! Request extractors whose rejections are rendered as JSON [`Error`]s.
//!
//! - [`Json`] reports malformed bodies as `400 { "error", "details" }`.
//! - [`Query`] does the same for unparseable query strings.
//!
//! [`Error`]: crate::handler::Error

mod reject;

pub use reject::{Json, Query};
