//! Structured mirror of the debug dump.
//!
//! [`NodeSnapshot`] carries the same information as the indented text
//! produced by [`Element::render_debug`][crate::element::Element::render_debug]
//! in a serde-serializable shape, for tools that would rather not parse text.

use arbor_types::Status;
use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::node::Node;

/// Last result of one decorator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratorSnapshot {
    pub name: String,
    pub passing: bool,
}

/// Point-in-time view of a node and everything attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub kind: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<DecoratorSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn capture(node: &Node) -> Self {
        Self {
            name: node.name().to_string(),
            kind: node.kind_label().to_string(),
            status: node.last_status(),
            services: node.services().iter().map(|s| s.name().to_string()).collect(),
            decorators: node
                .decorators()
                .iter()
                .map(|d| DecoratorSnapshot {
                    name: d.name().to_string(),
                    passing: d.last_result(),
                })
                .collect(),
            children: node.attached().map(NodeSnapshot::capture).collect(),
        }
    }

    /// Depth-first search by node name.
    pub fn find(&self, name: &str) -> Option<&NodeSnapshot> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Names of the nodes currently `InProgress`, outermost first.
    pub fn active_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = Some(self);
        while let Some(node) = current {
            if node.status != Status::InProgress {
                break;
            }
            path.push(node.name.as_str());
            current = node.children.iter().find(|c| c.status == Status::InProgress);
        }
        path
    }
}
