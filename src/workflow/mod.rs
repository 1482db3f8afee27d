//! n8n-style workflow documents and the connection rewriter that patches them.
//!
//! Only the `connections` member is modelled. Every other member of the document
//! (`nodes`, `settings`, unknown keys) is carried through untouched and keeps its
//! position when the document is written back.

pub mod rewire;

pub use rewire::{
    rewire_file, rewrite_connections, DanglingLink, Redirect, RewriteReport, RewriteRule,
    RewriteRules,
};

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

const CONNECTIONS_KEY: &str = "connections";

/// Connection mapping keyed by source node name, in document order.
pub type Connections = IndexMap<String, NodeConnections>;

/// One entry in the connection mapping: the outgoing edges of a single node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeConnections {
    /// Output branches, indexed by output position. Branch 1 is the "false" side of an IF node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<Vec<Vec<Link>>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl NodeConnections {
    pub fn branch(&self, index: usize) -> Option<&[Link]> {
        self.main
            .as_ref()
            .and_then(|branches| branches.get(index))
            .map(Vec::as_slice)
    }

    pub fn branch_mut(&mut self, index: usize) -> Option<&mut Vec<Link>> {
        self.main.as_mut().and_then(|branches| branches.get_mut(index))
    }

    /// First link of the first output branch, the single downstream target of a linear node.
    pub fn first_target(&self) -> Option<&str> {
        self.branch(0)
            .and_then(|branch| branch.first())
            .and_then(Link::node)
    }

    /// All links with their branch index.
    pub fn links(&self) -> impl Iterator<Item = (usize, &Link)> {
        self.main.iter().flat_map(|branches| {
            branches
                .iter()
                .enumerate()
                .flat_map(|(index, branch)| branch.iter().map(move |link| (index, link)))
        })
    }
}

/// A directed edge to another node, kept as the raw JSON value.
///
/// Links are usually `{"node", "type", "index"}` objects. Anything else, including a link
/// without a string `node`, is carried through untouched and never matches a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Link(Value);

impl Link {
    /// Target node name, when the link has a string `node` member.
    pub fn node(&self) -> Option<&str> {
        self.0.get("node").and_then(Value::as_str)
    }

    /// Point the link at `node`. Non-object links are left as they are.
    pub(crate) fn retarget(&mut self, node: &str) {
        if let Some(object) = self.0.as_object_mut() {
            object.insert("node".to_string(), Value::String(node.to_string()));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDocument {
    root: Map<String, Value>,
    connections: Option<Connections>,
}

#[allow(clippy::result_large_err)]
impl WorkflowDocument {
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        let Value::Object(root) = value else {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "workflow document must be a JSON object",
            ));
        };

        let connections = match root.get(CONNECTIONS_KEY) {
            Some(raw) => Some(Connections::deserialize(raw).map_err(|e| {
                AppError::new(
                    ErrorCategory::SerializationError,
                    format!("malformed workflow connections: {}", e),
                )
            })?),
            None => None,
        };

        Ok(WorkflowDocument { root, connections })
    }

    pub fn from_json_str(content: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            let mut error = AppError::from(e);
            error.add_context("path", &path.display().to_string());
            error
        })?;
        Self::from_json_str(&content).map_err(|mut e| {
            e.add_context("path", &path.display().to_string());
            e
        })
    }

    pub fn connections(&self) -> Option<&Connections> {
        self.connections.as_ref()
    }

    pub fn connections_mut(&mut self) -> Option<&mut Connections> {
        self.connections.as_mut()
    }

    /// Rebuild the JSON value, putting `connections` back in its original slot.
    pub fn to_value(&self) -> Result<Value, AppError> {
        let mut root = self.root.clone();
        if let Some(connections) = &self.connections {
            root.insert(CONNECTIONS_KEY.to_string(), serde_json::to_value(connections)?);
        }
        Ok(Value::Object(root))
    }

    /// Two-space indented JSON, non-ASCII written verbatim, no trailing newline.
    pub fn to_pretty_string(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let content = self.to_pretty_string()?;
        std::fs::write(path, content).map_err(|e| {
            let mut error = AppError::from(e);
            error.add_context("path", &path.display().to_string());
            error
        })
    }
}
