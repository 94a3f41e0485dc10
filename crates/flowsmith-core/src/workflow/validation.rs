//! Structural checks for generated workflow documents.
//!
//! Validation never stops at the first problem: every violation found is
//! collected so the caller can report the full list at once.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{WorkflowDocument, json_type_name};

/// A single structural problem, located by a JSON-pointer-like path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Location of the offending value, e.g. `/nodes/2/name`.
    pub path: String,
    /// What is wrong at that location.
    pub message: String,
}

impl Violation {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Checks node and connection shape, returning every violation found.
pub fn validate_structure(document: &WorkflowDocument) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    let names = check_nodes(document.get(WorkflowDocument::NODES), &mut violations);
    check_connections(
        document.get(WorkflowDocument::CONNECTIONS),
        &names,
        &mut violations,
    );

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Validates the node list and returns the set of well-formed node names.
fn check_nodes(nodes: Option<&Value>, violations: &mut Vec<Violation>) -> HashSet<String> {
    let mut names = HashSet::new();

    let nodes = match nodes {
        None => {
            violations.push(Violation::new("/nodes", "is required"));
            return names;
        }
        Some(Value::Array(nodes)) => nodes,
        Some(other) => {
            violations.push(Violation::new(
                "/nodes",
                format!("expected an array, found {}", json_type_name(other)),
            ));
            return names;
        }
    };

    if nodes.is_empty() {
        violations.push(Violation::new("/nodes", "must contain at least one node"));
    }

    let mut ids = HashSet::new();
    for (index, node) in nodes.iter().enumerate() {
        let path = format!("/nodes/{index}");
        let Some(node) = node.as_object() else {
            violations.push(Violation::new(
                path,
                format!("expected an object, found {}", json_type_name(node)),
            ));
            continue;
        };

        if let Some(name) = required_string(node, "name", &path, violations)
            && !names.insert(name.to_owned())
        {
            violations.push(Violation::new(
                format!("{path}/name"),
                format!("duplicate node name \"{name}\""),
            ));
        }

        required_string(node, "type", &path, violations);

        match node.get("id") {
            None | Some(Value::Null) => {}
            Some(Value::String(id)) => {
                if !ids.insert(id.clone()) {
                    violations.push(Violation::new(
                        format!("{path}/id"),
                        format!("duplicate node id \"{id}\""),
                    ));
                }
            }
            Some(other) => violations.push(Violation::new(
                format!("{path}/id"),
                format!("expected a string, found {}", json_type_name(other)),
            )),
        }

        if let Some(parameters) = node.get("parameters")
            && !parameters.is_object()
        {
            violations.push(Violation::new(
                format!("{path}/parameters"),
                format!("expected an object, found {}", json_type_name(parameters)),
            ));
        }
    }

    names
}

/// Returns the field as a non-empty string, recording a violation otherwise.
fn required_string<'a>(
    node: &'a Map<String, Value>,
    field: &str,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<&'a str> {
    let path = format!("{path}/{field}");
    match node.get(field) {
        None => {
            violations.push(Violation::new(path, "is required"));
            None
        }
        Some(Value::String(value)) if value.trim().is_empty() => {
            violations.push(Violation::new(path, "must not be empty"));
            None
        }
        Some(Value::String(value)) => Some(value),
        Some(other) => {
            violations.push(Violation::new(
                path,
                format!("expected a string, found {}", json_type_name(other)),
            ));
            None
        }
    }
}

fn check_connections(
    connections: Option<&Value>,
    names: &HashSet<String>,
    violations: &mut Vec<Violation>,
) {
    let connections = match connections {
        None => {
            violations.push(Violation::new("/connections", "is required"));
            return;
        }
        Some(Value::Object(connections)) => connections,
        Some(other) => {
            violations.push(Violation::new(
                "/connections",
                format!("expected an object, found {}", json_type_name(other)),
            ));
            return;
        }
    };

    for (source, outputs) in connections {
        let path = format!("/connections/{}", escape_pointer(source));
        if !names.contains(source) {
            violations.push(Violation::new(
                path.clone(),
                format!("source \"{source}\" is not a node name"),
            ));
        }

        let Some(outputs) = outputs.as_object() else {
            violations.push(Violation::new(
                path,
                format!("expected an object, found {}", json_type_name(outputs)),
            ));
            continue;
        };

        for (kind, branches) in outputs {
            let path = format!("{path}/{}", escape_pointer(kind));
            let Some(branches) = branches.as_array() else {
                violations.push(Violation::new(
                    path,
                    format!("expected an array, found {}", json_type_name(branches)),
                ));
                continue;
            };

            for (branch_index, branch) in branches.iter().enumerate() {
                let path = format!("{path}/{branch_index}");
                let endpoints = match branch {
                    Value::Null => continue,
                    Value::Array(endpoints) => endpoints,
                    other => {
                        violations.push(Violation::new(
                            path,
                            format!("expected an array, found {}", json_type_name(other)),
                        ));
                        continue;
                    }
                };

                for (endpoint_index, endpoint) in endpoints.iter().enumerate() {
                    check_endpoint(
                        endpoint,
                        &format!("{path}/{endpoint_index}"),
                        names,
                        violations,
                    );
                }
            }
        }
    }
}

fn check_endpoint(
    endpoint: &Value,
    path: &str,
    names: &HashSet<String>,
    violations: &mut Vec<Violation>,
) {
    let Some(endpoint) = endpoint.as_object() else {
        violations.push(Violation::new(
            path,
            format!("expected an object, found {}", json_type_name(endpoint)),
        ));
        return;
    };

    match endpoint.get("node") {
        Some(Value::String(target)) if names.contains(target) => {}
        Some(Value::String(target)) => violations.push(Violation::new(
            format!("{path}/node"),
            format!("target \"{target}\" is not a node name"),
        )),
        Some(other) => violations.push(Violation::new(
            format!("{path}/node"),
            format!("expected a string, found {}", json_type_name(other)),
        )),
        None => violations.push(Violation::new(format!("{path}/node"), "is required")),
    }
}

/// Escapes a JSON object key for use as a pointer segment.
fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
