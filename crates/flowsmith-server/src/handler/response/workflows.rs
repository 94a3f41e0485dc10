use flowsmith_core::workflow::WorkflowDocument;
use serde::{Deserialize, Serialize};

/// Successful generation: the finished document and the echoed description.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedWorkflow {
    /// Always `true`.
    pub success: bool,
    pub workflow: WorkflowDocument,
    pub description: String,
}

impl GeneratedWorkflow {
    pub fn new(workflow: WorkflowDocument, description: impl Into<String>) -> Self {
        Self {
            success: true,
            workflow,
            description: description.into(),
        }
    }
}
