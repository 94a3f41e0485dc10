//! Typed view over workflow nodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, IntoStaticStr};

use super::WorkflowDocument;

/// A single workflow step as emitted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// Node name; connections refer to nodes by this value.
    pub name: String,
    /// Engine type tag, e.g. `n8n-nodes-base.httpRequest`.
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Value>,
}

impl WorkflowNode {
    /// Classifies the node's type tag.
    pub fn category(&self) -> NodeCategory {
        NodeCategory::from_type_tag(&self.node_type)
    }
}

/// The node vocabulary suggested to the model.
///
/// The set is open-ended: unknown tags classify as [`NodeCategory::Other`]
/// and are never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    ManualTrigger,
    Webhook,
    HttpRequest,
    Code,
    If,
    Set,
    EmailSend,
    Other,
}

impl NodeCategory {
    /// Classifies an engine type tag such as `n8n-nodes-base.emailSend`
    /// or a display name such as `HTTP Request`.
    pub fn from_type_tag(tag: &str) -> Self {
        let base = tag.rsplit('.').next().unwrap_or(tag);
        let normalized: String = base
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "manualtrigger" => Self::ManualTrigger,
            "webhook" => Self::Webhook,
            "httprequest" => Self::HttpRequest,
            "code" | "function" | "functionitem" => Self::Code,
            "if" => Self::If,
            "set" => Self::Set,
            "emailsend" => Self::EmailSend,
            _ => Self::Other,
        }
    }

    /// Returns true for categories that start a workflow.
    pub fn is_trigger(self) -> bool {
        matches!(self, Self::ManualTrigger | Self::Webhook)
    }
}

/// Shape statistics for a generated workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    /// Number of entries in `nodes`.
    pub node_count: usize,
    /// Number of source-to-target edges in `connections`.
    pub edge_count: usize,
    /// Typed node count per category.
    pub categories: BTreeMap<NodeCategory, usize>,
    /// Whether any node is a trigger.
    pub has_trigger: bool,
}

impl WorkflowSummary {
    pub(crate) fn from_document(document: &WorkflowDocument) -> Self {
        let node_count = document.nodes().map_or(0, Vec::len);

        let mut categories = BTreeMap::new();
        for node in document.typed_nodes() {
            *categories.entry(node.category()).or_insert(0) += 1;
        }

        let edge_count = document
            .connections()
            .into_iter()
            .flat_map(|connections| connections.values())
            .filter_map(Value::as_object)
            .flat_map(|outputs| outputs.values())
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(Value::as_array)
            .map(Vec::len)
            .sum();

        let has_trigger = categories.keys().any(|category| category.is_trigger());

        Self {
            node_count,
            edge_count,
            categories,
            has_trigger,
        }
    }
}
