//! Rules nodes are created with.
//!
//! Only constants and two-input AND/OR/XOR-shaped rules exist. The textual
//! form rendered by [`Rule`]'s `Display` impl is what the rule service stores.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::name::NodeName;

/// Boolean rule of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "operands", rename_all = "lowercase")]
pub enum Rule {
    /// Constant rule used by leaf nodes. The effective value of a leaf is the
    /// last state set on it, not this constant.
    Constant(bool),

    /// True iff both operands are active.
    And(NodeName, NodeName),

    /// True iff either operand is active.
    Or(NodeName, NodeName),

    /// True iff exactly one operand is active.
    Xor(NodeName, NodeName),
}

impl Rule {
    /// Names this rule references, in rule order. A name referenced twice
    /// appears once.
    pub fn references(&self) -> Vec<&NodeName> {
        match self {
            Rule::Constant(_) => Vec::new(),
            Rule::And(a, b) | Rule::Or(a, b) | Rule::Xor(a, b) => {
                if a == b {
                    vec![a]
                } else {
                    vec![a, b]
                }
            }
        }
    }

    /// Check whether the rule references `name`.
    pub fn references_name(&self, name: &NodeName) -> bool {
        self.references().into_iter().any(|r| r == name)
    }

    /// Whether this is a constant (leaf) rule.
    pub fn is_constant(&self) -> bool {
        matches!(self, Rule::Constant(_))
    }

    /// Evaluate the rule given the current value of each referenced node.
    ///
    /// Returns `None` if any referenced value is unknown.
    pub fn evaluate<F>(&self, mut value_of: F) -> Option<bool>
    where
        F: FnMut(&NodeName) -> Option<bool>,
    {
        match self {
            Rule::Constant(c) => Some(*c),
            Rule::And(a, b) => Some(value_of(a)? && value_of(b)?),
            Rule::Or(a, b) => Some(value_of(a)? || value_of(b)?),
            Rule::Xor(a, b) => {
                let (a, b) = (value_of(a)?, value_of(b)?);
                Some((a || b) && !(a && b))
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Constant(true) => f.write_str("TRUE"),
            Rule::Constant(false) => f.write_str("FALSE"),
            Rule::And(a, b) => write!(f, "ALARM({:?}) AND ALARM({:?})", a.as_str(), b.as_str()),
            Rule::Or(a, b) => write!(f, "ALARM({:?}) OR ALARM({:?})", a.as_str(), b.as_str()),
            Rule::Xor(a, b) => write!(
                f,
                "(ALARM({a:?}) OR ALARM({b:?})) AND NOT (ALARM({a:?}) AND ALARM({b:?}))",
                a = a.as_str(),
                b = b.as_str()
            ),
        }
    }
}
