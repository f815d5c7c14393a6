//! Node states reported by the rule service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Evaluated state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// The node's rule holds.
    Active,

    /// The node's rule does not hold.
    Inactive,

    /// The service has not evaluated the node yet.
    Pending,
}

impl NodeState {
    /// Only `Active` reads as true.
    pub fn is_active(self) -> bool {
        matches!(self, NodeState::Active)
    }
}

impl From<bool> for NodeState {
    fn from(value: bool) -> Self {
        if value {
            NodeState::Active
        } else {
            NodeState::Inactive
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Active => f.write_str("active"),
            NodeState::Inactive => f.write_str("inactive"),
            NodeState::Pending => f.write_str("pending"),
        }
    }
}
