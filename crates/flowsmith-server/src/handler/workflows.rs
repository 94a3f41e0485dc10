//! Workflow generation handler.

use axum::Router;
use axum::extract::State;
use axum::http::header::{self, HeaderValue};
use axum::http::{HeaderName, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use flowsmith_core::workflow::WorkflowDocument;
use flowsmith_rig::{SynthesisError, Synthesizer};
use jiff::Timestamp;

use super::request::{DownloadParams, GenerateWorkflow};
use super::response::GeneratedWorkflow;
use crate::extract::{Json, Query};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{ServiceState, WorkflowExport};

/// Tracing target for workflow operations.
const TRACING_TARGET: &str = "flowsmith_server::handler::workflows";

/// Path of the generation endpoint.
pub const GENERATE_WORKFLOW_PATH: &str = "/api/generate-workflow";

/// Generates an n8n workflow from a natural-language description.
///
/// With `?download=true` the bare workflow is returned as a JSON attachment.
#[tracing::instrument(skip_all)]
async fn generate_workflow(
    State(synthesizer): State<Synthesizer>,
    State(export): State<WorkflowExport>,
    Query(params): Query<DownloadParams>,
    Json(request): Json<GenerateWorkflow>,
) -> Result<Response> {
    let description = request.into_description();

    tracing::info!(
        target: TRACING_TARGET,
        description_len = description.len(),
        download = params.download,
        "workflow generation requested"
    );

    let workflow = match synthesizer.synthesize(&description).await {
        Ok(workflow) => workflow,
        Err(SynthesisError::InvalidInput) => {
            tracing::debug!(target: TRACING_TARGET, "description missing or blank");
            return Err(ErrorKind::MissingDescription.into_error());
        }
        Err(err) => return Err(Error::from(err).with_description(description)),
    };

    if params.download {
        return attachment(&export, &workflow);
    }

    Ok(Json(GeneratedWorkflow::new(workflow, description)).into_response())
}

/// Renders `workflow` as a pretty-printed JSON file download.
fn attachment(export: &WorkflowExport, workflow: &WorkflowDocument) -> Result<Response> {
    let at = Timestamp::now();
    let file_name = export.file_name(at);
    let disposition = HeaderValue::from_str(&export.content_disposition(at)).map_err(|err| {
        ErrorKind::InternalServerError
            .with_message("Failed to prepare workflow download")
            .with_details(err.to_string())
    })?;

    let body = serde_json::to_string_pretty(workflow).map_err(|err| {
        ErrorKind::InternalServerError
            .with_message("Failed to prepare workflow download")
            .with_details(err.to_string())
    })?;

    tracing::debug!(
        target: TRACING_TARGET,
        file_name = %file_name,
        size = body.len(),
        "workflow returned as attachment"
    );

    let headers: [(HeaderName, HeaderValue); 2] = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, body).into_response())
}

/// Rejects every method but POST without touching the synthesizer.
async fn method_not_allowed(method: Method) -> Response {
    tracing::debug!(
        target: TRACING_TARGET,
        method = %method,
        "method not allowed"
    );

    (
        [(header::ALLOW, HeaderValue::from_static("POST"))],
        ErrorKind::MethodNotAllowed,
    )
        .into_response()
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route(
        GENERATE_WORKFLOW_PATH,
        post(generate_workflow).fallback(method_not_allowed),
    )
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::body::Bytes;
    use axum::http::StatusCode;
    use flowsmith_core::ErrorKind as BackendErrorKind;
    use flowsmith_rig::SynthesisOptions;
    use flowsmith_rig::provider::MockBackend;
    use serde_json::{Value, json};

    use super::*;
    use crate::handler::test::{
        create_test_server, create_test_server_with_state, create_test_state,
    };

    const EMPTY_WORKFLOW: &str = r#"{"nodes":[],"connections":{}}"#;

    #[tokio::test]
    async fn generates_workflow_with_meta() -> anyhow::Result<()> {
        let backend = Arc::new(MockBackend::new(EMPTY_WORKFLOW));
        let server = create_test_server(backend.clone())?;

        let response = server
            .post(GENERATE_WORKFLOW_PATH)
            .json(&json!({ "description": "Send a Slack message every morning" }))
            .await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["success"], true);
        assert_eq!(body["description"], "Send a Slack message every morning");
        assert_eq!(body["workflow"]["nodes"], json!([]));
        assert_eq!(body["workflow"]["connections"], json!({}));
        assert_eq!(
            body["workflow"]["meta"]["description"],
            "Send a Slack message every morning"
        );
        assert_eq!(body["workflow"]["meta"]["version"], "1.0.0-test");
        assert!(body["workflow"]["meta"]["generatedAt"].is_string());
        assert_eq!(backend.calls(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn blank_description_is_rejected_without_backend_call() -> anyhow::Result<()> {
        let backend = Arc::new(MockBackend::new(EMPTY_WORKFLOW));
        let server = create_test_server(backend.clone())?;

        for body in [json!({ "description": "   \n\t" }), json!({ "description": "" }), json!({})] {
            let response = server.post(GENERATE_WORKFLOW_PATH).json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            response.assert_json(&json!({ "error": "Description is required" }));
        }

        assert_eq!(backend.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn other_methods_are_not_allowed() -> anyhow::Result<()> {
        let backend = Arc::new(MockBackend::new(EMPTY_WORKFLOW));
        let server = create_test_server(backend.clone())?;

        for response in [
            server.get(GENERATE_WORKFLOW_PATH).await,
            server.put(GENERATE_WORKFLOW_PATH).await,
            server.delete(GENERATE_WORKFLOW_PATH).await,
        ] {
            response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
            response.assert_json(&json!({ "error": "Method not allowed" }));
            assert_eq!(response.header(header::ALLOW), "POST");
        }

        assert_eq!(backend.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() -> anyhow::Result<()> {
        let backend = Arc::new(MockBackend::new(EMPTY_WORKFLOW));
        let server = create_test_server(backend.clone())?;

        let response = server
            .post(GENERATE_WORKFLOW_PATH)
            .bytes(Bytes::from_static(b"{\"description\": "))
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "Invalid JSON syntax in request body");
        assert!(body["details"].is_string());

        let response = server
            .post(GENERATE_WORKFLOW_PATH)
            .json(&json!({ "description": 42 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Invalid request data format");

        assert_eq!(backend.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn unparseable_completion_reports_raw_content() -> anyhow::Result<()> {
        let server = create_test_server(Arc::new(MockBackend::new("not json")))?;

        let response = server
            .post(GENERATE_WORKFLOW_PATH)
            .json(&json!({ "description": "Create a webhook" }))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.json::<Value>();
        assert_eq!(body["error"], "Failed to generate valid workflow JSON");
        assert_eq!(body["rawContent"], "not json");
        assert_eq!(body["description"], "Create a webhook");
        assert!(!body["details"].as_str().unwrap_or_default().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn long_completion_is_truncated() -> anyhow::Result<()> {
        let raw = "x".repeat(10_000);
        let server = create_test_server(Arc::new(MockBackend::new(raw.clone())))?;

        let response = server
            .post(GENERATE_WORKFLOW_PATH)
            .json(&json!({ "description": "Anything" }))
            .await;

        let body = response.json::<Value>();
        let raw_content = body["rawContent"].as_str().unwrap_or_default();
        assert_eq!(raw_content.len(), 503);
        assert!(raw_content.starts_with(&raw[..500]));
        assert!(raw_content.ends_with("..."));

        Ok(())
    }

    #[tokio::test]
    async fn backend_failure_is_reported() -> anyhow::Result<()> {
        let backend = MockBackend::failing(BackendErrorKind::NetworkError, "connection refused");
        let server = create_test_server(Arc::new(backend))?;

        let response = server
            .post(GENERATE_WORKFLOW_PATH)
            .json(&json!({ "description": "Sync contacts" }))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.json::<Value>();
        assert_eq!(body["error"], "Failed to generate workflow");
        assert_eq!(body["details"], "connection refused");
        assert_eq!(body["description"], "Sync contacts");
        assert!(body.get("rawContent").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn structural_violations_are_listed() -> anyhow::Result<()> {
        let options = SynthesisOptions::default().with_structure_validation(true);
        let state = create_test_state(Arc::new(MockBackend::new(EMPTY_WORKFLOW)), options);
        let server = create_test_server_with_state(state)?;

        let response = server
            .post(GENERATE_WORKFLOW_PATH)
            .json(&json!({ "description": "Do nothing" }))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.json::<Value>();
        assert_eq!(body["error"], "Generated workflow failed structural validation");
        assert_eq!(body["description"], "Do nothing");
        let violations = body["violations"].as_array().cloned().unwrap_or_default();
        assert!(!violations.is_empty());
        assert!(
            violations
                .iter()
                .all(|violation| violation.as_str().is_some_and(|v| v.starts_with('/')))
        );

        Ok(())
    }

    #[tokio::test]
    async fn download_returns_bare_workflow_attachment() -> anyhow::Result<()> {
        let server = create_test_server(Arc::new(MockBackend::new(EMPTY_WORKFLOW)))?;

        let response = server
            .post(GENERATE_WORKFLOW_PATH)
            .add_query_param("download", "true")
            .json(&json!({ "description": "Nightly backup" }))
            .await;
        response.assert_status_ok();

        let disposition = response.header(header::CONTENT_DISPOSITION);
        let disposition = disposition.to_str()?;
        let millis = disposition
            .strip_prefix("attachment; filename=\"n8n-workflow-test-")
            .and_then(|rest| rest.strip_suffix(".json\""))
            .unwrap_or_default();
        assert!(!millis.is_empty() && millis.chars().all(|c| c.is_ascii_digit()));

        let body = response.json::<Value>();
        assert!(body.get("success").is_none());
        assert_eq!(body["meta"]["description"], "Nightly backup");
        assert_eq!(body["nodes"], json!([]));

        Ok(())
    }

    #[tokio::test]
    async fn download_failures_keep_error_payload() -> anyhow::Result<()> {
        let server = create_test_server(Arc::new(MockBackend::new("not json")))?;

        let response = server
            .post(GENERATE_WORKFLOW_PATH)
            .add_query_param("download", "true")
            .json(&json!({ "description": "Nightly backup" }))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.maybe_header(header::CONTENT_DISPOSITION).is_none());

        let response = server
            .post(GENERATE_WORKFLOW_PATH)
            .add_query_param("download", "maybe")
            .json(&json!({ "description": "Nightly backup" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        Ok(())
    }

    #[tokio::test]
    async fn custom_export_prefix() -> anyhow::Result<()> {
        let state = create_test_state(
            Arc::new(MockBackend::new(EMPTY_WORKFLOW)),
            SynthesisOptions::default(),
        )
        .with_export(WorkflowExport::new("daily-report"));
        let server = create_test_server_with_state(state)?;

        let response = server
            .post(GENERATE_WORKFLOW_PATH)
            .add_query_param("download", "true")
            .json(&json!({ "description": "Daily report" }))
            .await;

        let disposition = response.header(header::CONTENT_DISPOSITION);
        assert!(disposition.to_str()?.starts_with("attachment; filename=\"daily-report-"));

        Ok(())
    }

    #[tokio::test]
    async fn responses_differ_only_in_generated_at() -> anyhow::Result<()> {
        let server = create_test_server(Arc::new(MockBackend::new(EMPTY_WORKFLOW)))?;
        let request = json!({ "description": "Same request" });

        let mut first = server.post(GENERATE_WORKFLOW_PATH).json(&request).await.json::<Value>();
        let mut second = server.post(GENERATE_WORKFLOW_PATH).json(&request).await.json::<Value>();

        for body in [&mut first, &mut second] {
            if let Some(meta) = body["workflow"]["meta"].as_object_mut() {
                meta.remove("generatedAt");
            }
        }
        assert_eq!(first, second);

        Ok(())
    }
}
