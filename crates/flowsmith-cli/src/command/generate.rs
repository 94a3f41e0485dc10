//! `flowsmith generate`: synthesize one workflow and write it out.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use flowsmith_core::workflow::WorkflowDocument;
use flowsmith_rig::SynthesisError;
use flowsmith_server::service::{ServiceConfig, ServiceState, WorkflowExport};
use jiff::Timestamp;

use crate::TRACING_TARGET_STARTUP;
use crate::config::GenerateArgs;

/// Where a generated workflow ended up.
#[derive(Debug, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

/// Generates a workflow for `args.description` and prints it to stdout or
/// writes it to `<prefix>-<unix millis>.json` in the output directory.
///
/// # Errors
///
/// Fails when the service cannot be configured, when synthesis fails, or
/// when the file cannot be written.
pub async fn generate(config: &ServiceConfig, args: &GenerateArgs) -> anyhow::Result<Output> {
    let state = ServiceState::from_config(config).context("failed to create service state")?;

    let workflow = state
        .synthesizer()
        .synthesize(&args.description)
        .await
        .map_err(describe_failure)?;

    if args.stdout {
        println!("{}", to_pretty_json(&workflow)?);
        return Ok(Output::Stdout);
    }

    let export = match args.prefix.as_deref() {
        Some(prefix) => WorkflowExport::new(prefix),
        None => config.export(),
    };
    export.validate().context("invalid file name prefix")?;

    let path = write_workflow(&workflow, &export, &args.output_dir).await?;
    Ok(Output::File(path))
}

async fn write_workflow(
    workflow: &WorkflowDocument,
    export: &WorkflowExport,
    output_dir: &Path,
) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let path = output_dir.join(export.file_name(Timestamp::now()));
    tokio::fs::write(&path, to_pretty_json(workflow)?)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        path = %path.display(),
        "Workflow written"
    );

    Ok(path)
}

fn to_pretty_json(workflow: &WorkflowDocument) -> anyhow::Result<String> {
    serde_json::to_string_pretty(workflow).context("failed to serialize workflow")
}

fn describe_failure(error: SynthesisError) -> anyhow::Error {
    let mut message = error.title().to_owned();

    if let Some(details) = error.details() {
        message.push_str(": ");
        message.push_str(&details);
    }

    if let SynthesisError::MalformedOutput { raw_content, .. } = &error {
        message.push_str("\nraw content: ");
        message.push_str(raw_content);
    }

    anyhow!(message)
}
