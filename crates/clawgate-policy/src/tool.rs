//! Tool identifiers and policy-list references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a single tool capability (e.g. `exec`, `read`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(String);

impl ToolId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToolId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// One entry in an allow/deny list: a concrete tool or a `group:` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRef {
    Tool(ToolId),
    Group(String),
}

impl ToolRef {
    /// Parse a policy list entry. `group:NAME` selects a tool group, any
    /// other string names a single tool.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix("group:") {
            Some(group) => ToolRef::Group(group.to_string()),
            None => ToolRef::Tool(ToolId::new(raw)),
        }
    }
}
