use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate-workflow`.
///
/// A missing `description` is accepted here and rejected by the synthesizer
/// together with empty and whitespace-only values.
#[must_use]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateWorkflow {
    #[serde(default)]
    pub description: Option<String>,
}

impl GenerateWorkflow {
    /// Returns the description, or an empty string when absent.
    pub fn into_description(self) -> String {
        self.description.unwrap_or_default()
    }
}

/// Query parameters of `POST /api/generate-workflow`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadParams {
    /// Return the bare workflow as a file attachment.
    #[serde(default)]
    pub download: bool,
}
