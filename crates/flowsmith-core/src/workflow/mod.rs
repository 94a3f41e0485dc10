//! Workflow request, document and provenance types.
//!
//! A [`WorkflowDocument`] is the JSON object produced by the completion
//! backend, kept verbatim so that every field the model emitted survives the
//! round trip, with typed accessors for the parts flowsmith cares about.

mod node;
mod validation;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use node::{NodeCategory, WorkflowNode, WorkflowSummary};
pub use validation::{Violation, validate_structure};

use crate::{Error, Result};

/// Version tag stamped into every generated document's meta block.
pub const SYNTHESIZER_VERSION: &str = "1.0.0-test";

/// Default prefix used for exported workflow file names.
pub const EXPORT_FILE_PREFIX: &str = "n8n-workflow-test";

/// A caller's request to generate a workflow.
///
/// The description is guaranteed to contain non-whitespace text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowRequest {
    description: String,
}

impl WorkflowRequest {
    /// Creates a request, rejecting empty or whitespace-only descriptions.
    pub fn new(description: impl Into<String>) -> Result<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(Error::invalid_input().with_message("Description is required"));
        }

        Ok(Self { description })
    }

    /// Returns the description exactly as supplied.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Consumes the request and returns the description.
    pub fn into_description(self) -> String {
        self.description
    }
}

/// Provenance attached to a generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowMeta {
    /// When the document was generated.
    pub generated_at: Timestamp,
    /// The request text, verbatim.
    pub description: String,
    /// Synthesizer version tag.
    pub version: String,
}

impl WorkflowMeta {
    /// Creates meta for a document generated now from `description`.
    pub fn now(description: impl Into<String>) -> Self {
        Self {
            generated_at: Timestamp::now(),
            description: description.into(),
            version: SYNTHESIZER_VERSION.to_owned(),
        }
    }
}

/// A generated workflow: a JSON object holding `nodes`, `connections` and,
/// once finalized, `meta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(derive_more::Deref, derive_more::AsRef)]
#[serde(transparent)]
pub struct WorkflowDocument(Map<String, Value>);

impl WorkflowDocument {
    /// Key of the provenance block.
    pub const META: &str = "meta";
    /// Key of the node list.
    pub const NODES: &str = "nodes";
    /// Key of the connection map.
    pub const CONNECTIONS: &str = "connections";

    /// Wraps an already-parsed JSON object.
    pub fn from_object(object: Map<String, Value>) -> Self {
        Self(object)
    }

    /// Returns the raw node list, if present and an array.
    pub fn nodes(&self) -> Option<&Vec<Value>> {
        self.0.get(Self::NODES).and_then(Value::as_array)
    }

    /// Returns the raw connection map, if present and an object.
    pub fn connections(&self) -> Option<&Map<String, Value>> {
        self.0.get(Self::CONNECTIONS).and_then(Value::as_object)
    }

    /// Returns the nodes that deserialize into [`WorkflowNode`], skipping the rest.
    pub fn typed_nodes(&self) -> Vec<WorkflowNode> {
        self.nodes()
            .into_iter()
            .flatten()
            .filter_map(|node| serde_json::from_value(node.clone()).ok())
            .collect()
    }

    /// Returns the provenance block, if attached and well-formed.
    pub fn meta(&self) -> Option<WorkflowMeta> {
        self.0
            .get(Self::META)
            .and_then(|meta| serde_json::from_value(meta.clone()).ok())
    }

    /// Attaches (or replaces) the provenance block.
    pub fn with_meta(mut self, meta: &WorkflowMeta) -> Result<Self> {
        let value = serde_json::to_value(meta).map_err(|err| {
            Error::new(crate::ErrorKind::Serialization)
                .with_message("failed to serialize workflow meta")
                .with_source(err)
        })?;

        self.0.insert(Self::META.to_owned(), value);
        Ok(self)
    }

    /// Summarizes node categories and edge counts.
    pub fn summary(&self) -> WorkflowSummary {
        WorkflowSummary::from_document(self)
    }

    /// Returns the underlying JSON object.
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the document and returns it as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Returns the export file name `<prefix>-<unix millis>.json` for `at`.
    pub fn export_file_name(prefix: &str, at: Timestamp) -> String {
        format!("{}-{}.json", prefix, at.as_millisecond())
    }
}

impl TryFrom<Value> for WorkflowDocument {
    type Error = Error;

    /// Accepts only a JSON object at the top level.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(object) => Ok(Self(object)),
            other => Err(Error::invalid_input().with_message(format!(
                "expected a JSON object at the top level, found {}",
                json_type_name(&other)
            ))),
        }
    }
}

/// Returns a human-readable name for the JSON type of `value`.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_rejects_blank_descriptions() {
        assert!(WorkflowRequest::new("").is_err());
        assert!(WorkflowRequest::new("   \n\t").is_err());

        let error = WorkflowRequest::new("").unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::InvalidInput);
    }

    #[test]
    fn request_keeps_description_verbatim() {
        let request = WorkflowRequest::new("  Ping a URL every hour ").unwrap();
        assert_eq!(request.description(), "  Ping a URL every hour ");
    }

    #[test]
    fn document_requires_object() {
        assert!(WorkflowDocument::try_from(json!([1, 2])).is_err());
        assert!(WorkflowDocument::try_from(json!("workflow")).is_err());

        let error = WorkflowDocument::try_from(json!(null)).unwrap_err();
        assert!(error.to_string().contains("found null"));
    }

    #[test]
    fn meta_is_attached_and_read_back() {
        let document =
            WorkflowDocument::try_from(json!({ "nodes": [], "connections": {} })).unwrap();
        let meta = WorkflowMeta::now("Send me an email");
        let document = document.with_meta(&meta).unwrap();

        assert_eq!(document.meta(), Some(meta));
        assert_eq!(document.nodes(), Some(&Vec::new()));
        assert!(document.connections().is_some_and(Map::is_empty));

        let value = document.into_value();
        assert_eq!(value["meta"]["description"], "Send me an email");
        assert_eq!(value["meta"]["version"], SYNTHESIZER_VERSION);
        assert!(value["meta"]["generatedAt"].is_string());
    }

    #[test]
    fn meta_replaces_backend_supplied_meta() {
        let document =
            WorkflowDocument::try_from(json!({ "nodes": [], "meta": { "instanceId": "x" } }))
                .unwrap();
        let document = document.with_meta(&WorkflowMeta::now("ping")).unwrap();

        assert!(document["meta"].get("instanceId").is_none());
        assert_eq!(document["meta"]["description"], "ping");
    }

    #[test]
    fn typed_nodes_skip_malformed_entries() {
        let document = WorkflowDocument::try_from(json!({
            "nodes": [
                { "name": "Start", "type": "n8n-nodes-base.manualTrigger" },
                { "type": "n8n-nodes-base.set" },
                42
            ]
        }))
        .unwrap();

        let nodes = document.typed_nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "Start");
    }

    #[test]
    fn export_file_name_uses_millis() {
        let at = Timestamp::from_millisecond(1_700_000_000_123).unwrap();
        assert_eq!(
            WorkflowDocument::export_file_name(EXPORT_FILE_PREFIX, at),
            "n8n-workflow-test-1700000000123.json"
        );
    }
}
