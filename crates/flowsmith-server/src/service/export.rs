use flowsmith_core::Result;
use flowsmith_core::workflow::{EXPORT_FILE_PREFIX, WorkflowDocument};
use jiff::Timestamp;

use super::config::validate_prefix;

/// Naming of downloaded workflow files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowExport {
    prefix: String,
}

impl WorkflowExport {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns `<prefix>-<unix millis>.json`.
    pub fn file_name(&self, at: Timestamp) -> String {
        WorkflowDocument::export_file_name(&self.prefix, at)
    }

    /// Returns the `Content-Disposition` value for a download made at `at`.
    pub fn content_disposition(&self, at: Timestamp) -> String {
        format!("attachment; filename=\"{}\"", self.file_name(at))
    }

    /// Checks that the prefix is a usable file name prefix.
    pub fn validate(&self) -> Result<()> {
        validate_prefix(&self.prefix)
    }
}

impl Default for WorkflowExport {
    fn default() -> Self {
        Self::new(EXPORT_FILE_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_disposition_uses_millis() {
        let at = Timestamp::from_millisecond(1_700_000_000_123).unwrap();
        assert_eq!(
            WorkflowExport::default().content_disposition(at),
            "attachment; filename=\"n8n-workflow-test-1700000000123.json\""
        );
    }
}
