//! Rule service trait definition.

use async_trait::async_trait;
use logicnet_types::{NodeName, NodeState, Rule};
use std::collections::HashMap;

use crate::error::{Result, ServiceError};

/// Contract of the external rule evaluation service.
#[async_trait]
pub trait RuleService: Send + Sync {
    /// Create a node with the given rule.
    ///
    /// Fails if the name exists or the rule references a missing node.
    async fn create_rule_node(&self, name: &NodeName, rule: &Rule) -> Result<()>;

    /// Force the state of a node.
    ///
    /// The override lasts until the service next re-derives the node, so it
    /// is only durable on constant-rule nodes.
    async fn override_state(&self, name: &NodeName, value: bool) -> Result<()>;

    /// Fetch the state of each named node, in whatever order the service
    /// answers. Unknown names are left out of the answer.
    async fn describe_states(&self, names: &[NodeName]) -> Result<Vec<(NodeName, NodeState)>>;

    /// Names referenced by the node's rule.
    async fn query_children(&self, name: &NodeName) -> Result<Vec<NodeName>>;

    /// Names of nodes whose rule references this node.
    async fn query_parents(&self, name: &NodeName) -> Result<Vec<NodeName>>;

    /// Delete a node. Fails while any other node references it.
    async fn delete_node(&self, name: &NodeName) -> Result<()>;

    /// Fetch states aligned to the order of `names`.
    async fn query_states(&self, names: &[NodeName]) -> Result<Vec<NodeState>> {
        let answered = self.describe_states(names).await?;
        align_states(names, answered)
    }
}

/// Re-sort a batched answer into request order.
pub fn align_states(
    names: &[NodeName],
    answered: Vec<(NodeName, NodeState)>,
) -> Result<Vec<NodeState>> {
    let mismatch = |returned| ServiceError::InconsistentRead {
        requested: names.len(),
        returned,
    };
    if answered.len() != names.len() {
        return Err(mismatch(answered.len()));
    }
    let returned = answered.len();
    let by_name: HashMap<NodeName, NodeState> = answered.into_iter().collect();
    names
        .iter()
        .map(|name| by_name.get(name).copied().ok_or_else(|| mismatch(returned)))
        .collect()
}
