//! Error types for logicnet-types.

use thiserror::Error;

/// Errors raised when validating a node name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The name is empty.
    #[error("node name must not be empty")]
    Empty,

    /// The name exceeds the service limit.
    #[error("node name is {len} characters long, limit is {max}")]
    TooLong { len: usize, max: usize },

    /// The name contains a control character.
    #[error("node name {0:?} contains a control character")]
    ControlCharacter(String),
}
