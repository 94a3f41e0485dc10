//! Middleware for `axum::Router`.
//!
//! Each concern is an extension trait on [`Router`](axum::Router):
//!
//! ```rust,no_run
//! use axum::Router;
//! use flowsmith_server::middleware::{
//!     BodyLimitConfig, CorsConfig, RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt,
//!     RouterSecurityExt,
//! };
//!
//! let app: Router = Router::new()
//!     .with_security(&CorsConfig::default(), &BodyLimitConfig::default())
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```

mod observability;
mod recovery;
mod security;

pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{BodyLimitConfig, CorsConfig, RouterSecurityExt};
