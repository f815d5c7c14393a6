//! Node identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::NameError;

/// Longest name the rule service accepts.
pub const MAX_NAME_LEN: usize = 255;

/// Globally unique name of a node stored by the rule service.
///
/// Circuit topology is encoded in these names: every node a circuit owns is
/// named `<role>:<kind>:<circuit name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeName(String);

impl NodeName {
    /// Create a validated name.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        let len = name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(NameError::TooLong {
                len,
                max: MAX_NAME_LEN,
            });
        }
        if name.chars().any(char::is_control) {
            return Err(NameError::ControlCharacter(name));
        }
        Ok(Self(name))
    }

    /// Build the name of a node owned by a circuit: `<role>:<kind>:<owner>`.
    pub fn derived(role: impl fmt::Display, kind: &str, owner: &NodeName) -> Self {
        Self(format!("{}:{}:{}", role, kind, owner.0))
    }

    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the name and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for NodeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeName {
    type Error = NameError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl From<NodeName> for String {
    fn from(name: NodeName) -> Self {
        name.0
    }
}

impl std::str::FromStr for NodeName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
