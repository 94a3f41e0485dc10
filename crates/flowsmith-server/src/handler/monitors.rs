//! Liveness and backend identification.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use flowsmith_core::ServiceHealth;
use flowsmith_rig::Synthesizer;

use crate::extract::Json;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "flowsmith_server::handler::monitors";

/// Reports the server version and the configured provider and model.
///
/// Does not call the completion backend.
#[tracing::instrument(skip_all)]
async fn health_status(State(synthesizer): State<Synthesizer>) -> Json<ServiceHealth> {
    tracing::debug!(target: TRACING_TARGET, "health status check requested");

    let health = ServiceHealth::healthy()
        .with_detail("version", env!("CARGO_PKG_VERSION"))
        .with_detail("provider", synthesizer.provider_name())
        .with_detail("model", synthesizer.model_name());

    Json(health)
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}
