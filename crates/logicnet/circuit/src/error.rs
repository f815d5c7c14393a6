//! Error types for logicnet-circuit.

use logicnet_service::ServiceError;
use logicnet_types::{NameError, NodeName};
use thiserror::Error;

/// Errors raised while building, driving or tearing down a circuit.
#[derive(Debug, Error)]
pub enum CircuitError {
    /// A node could not be created.
    #[error("could not create {name} with rule {rule}: {source}")]
    Create {
        name: NodeName,
        rule: String,
        source: ServiceError,
    },

    /// A node's state could not be set.
    #[error("setting state of {name} to {value}: {source}")]
    Override {
        name: NodeName,
        value: bool,
        source: ServiceError,
    },

    /// A batched state read failed.
    #[error("reading {count} states: {source}")]
    Read { count: usize, source: ServiceError },

    /// The service answered a batched read with a different set of nodes.
    #[error("inconsistent read: requested {requested} states, got {returned}")]
    InconsistentRead { requested: usize, returned: usize },

    /// A child or parent query failed.
    #[error("finding {direction} of {name}: {source}")]
    Traverse {
        name: NodeName,
        direction: Direction,
        source: ServiceError,
    },

    /// A node could not be deleted.
    #[error("deleting {name}: {source}")]
    Delete { name: NodeName, source: ServiceError },

    /// A circuit name leaves no room for the names derived from it.
    #[error("invalid node name: {0}")]
    Name(#[from] NameError),

    /// A blueprint lists nodes in an order the service would reject.
    #[error("invalid blueprint: {0}")]
    Blueprint(String),

    /// The graph could not be written.
    #[error("writing graph: {0}")]
    Io(#[from] std::io::Error),
}

/// Direction of a dependency query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Children,
    Parents,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Children => f.write_str("children"),
            Direction::Parents => f.write_str("parents"),
        }
    }
}

/// Result type for circuit operations.
pub type Result<T> = std::result::Result<T, CircuitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_error_names_node_and_rule() {
        let name = NodeName::new("cout:ha:x").unwrap();
        let e = CircuitError::Create {
            name: name.clone(),
            rule: "TRUE".into(),
            source: ServiceError::AlreadyExists(name),
        };
        let msg = e.to_string();
        assert!(msg.contains("cout:ha:x"));
        assert!(msg.contains("TRUE"));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn traverse_error_display() {
        let name = NodeName::new("lin0:rca:x").unwrap();
        let e = CircuitError::Traverse {
            name: name.clone(),
            direction: Direction::Parents,
            source: ServiceError::NotFound(name),
        };
        assert!(e.to_string().starts_with("finding parents of lin0:rca:x"));
    }
}
