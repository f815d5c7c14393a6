//! JSON bodies exchanged with a remote rule service.
//!
//! | call | request | success |
//! |---|---|---|
//! | create | `POST /v1/nodes` [`CreateNodeRequest`] | 201 |
//! | override | `PUT /v1/nodes/{name}/state` [`OverrideStateRequest`] | 204 |
//! | states | `POST /v1/states` [`DescribeStatesRequest`] | 200 `[NodeStateEntry]` |
//! | children | `GET /v1/nodes/{name}/children` | 200 `[name]` |
//! | parents | `GET /v1/nodes/{name}/parents` | 200 `[name]` |
//! | delete | `DELETE /v1/nodes/{name}` | 204 |
//!
//! Failures carry an [`ApiErrorBody`].

use chrono::{DateTime, Utc};
use logicnet_types::{NodeName, NodeState, Rule};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Create a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNodeRequest {
    pub name: NodeName,
    /// Rule in the service's textual form.
    pub expression: String,
    pub rule: Rule,
}

/// Force the state of a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideStateRequest {
    pub state: NodeState,
    pub reason: String,
    pub reason_data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Batched state query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeStatesRequest {
    pub names: Vec<NodeName>,
}

/// One entry of a batched state answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStateEntry {
    pub name: NodeName,
    pub state: NodeState,
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    AlreadyExists,
    NotFound,
    MissingReference,
    StillReferenced,
    Other,
}

/// Error body returned with any non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: ErrorCode,
    pub message: String,
    /// Node the error is about.
    #[serde(default)]
    pub node: Option<NodeName>,
    /// Related nodes: the missing reference, or the remaining parents.
    #[serde(default)]
    pub related: Vec<NodeName>,
}

impl ApiErrorBody {
    /// HTTP status and body a server answers with for an error.
    pub fn from_error(error: &ServiceError) -> (u16, Self) {
        let message = error.to_string();
        let (status, code, node, related) = match error {
            ServiceError::AlreadyExists(name) => {
                (409, ErrorCode::AlreadyExists, Some(name.clone()), vec![])
            }
            ServiceError::NotFound(name) => (404, ErrorCode::NotFound, Some(name.clone()), vec![]),
            ServiceError::MissingReference { node, reference } => (
                422,
                ErrorCode::MissingReference,
                Some(node.clone()),
                vec![reference.clone()],
            ),
            ServiceError::StillReferenced { node, parents } => (
                409,
                ErrorCode::StillReferenced,
                Some(node.clone()),
                parents.clone(),
            ),
            ServiceError::Api { status, .. } => (*status, ErrorCode::Other, None, vec![]),
            _ => (500, ErrorCode::Other, None, vec![]),
        };
        (
            status,
            Self {
                code,
                message,
                node,
                related,
            },
        )
    }

    /// Turn a received error body back into a typed error.
    pub fn into_error(self, status: u16) -> ServiceError {
        match (self.code, self.node) {
            (ErrorCode::AlreadyExists, Some(node)) => ServiceError::AlreadyExists(node),
            (ErrorCode::NotFound, Some(node)) => ServiceError::NotFound(node),
            (ErrorCode::MissingReference, Some(node)) => match self.related.into_iter().next() {
                Some(reference) => ServiceError::MissingReference { node, reference },
                None => ServiceError::Api {
                    status,
                    message: self.message,
                },
            },
            (ErrorCode::StillReferenced, Some(node)) => ServiceError::StillReferenced {
                node,
                parents: self.related,
            },
            _ => ServiceError::Api {
                status,
                message: self.message,
            },
        }
    }
}
