//! Error types for logicnet-service.

use logicnet_types::NodeName;
use thiserror::Error;

/// Errors returned by rule service calls.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the request for a reason without its own variant.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// A node with this name already exists.
    #[error("node already exists: {0}")]
    AlreadyExists(NodeName),

    /// No node with this name exists.
    #[error("node not found: {0}")]
    NotFound(NodeName),

    /// A rule references a node that does not exist.
    #[error("rule of {node} references missing node {reference}")]
    MissingReference { node: NodeName, reference: NodeName },

    /// The node is still referenced by other nodes' rules.
    #[error("{node} is still referenced by {}", join(.parents))]
    StillReferenced {
        node: NodeName,
        parents: Vec<NodeName>,
    },

    /// A batched query answered with a different set of nodes than requested.
    #[error("inconsistent read: requested {requested} states, got {returned}")]
    InconsistentRead { requested: usize, returned: usize },

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Credentials could not be loaded.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn join(names: &[NodeName]) -> String {
    names
        .iter()
        .map(NodeName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for rule service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
