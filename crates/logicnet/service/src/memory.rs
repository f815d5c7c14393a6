//! In-memory rule service for tests and offline runs.
//!
//! Enforces the same constraints as the remote service and answers batched
//! queries in name order rather than request order. Derived states are
//! re-evaluated only once `latency` has passed since the last write, measured
//! on the tokio clock, so paused-time tests can step through convergence.

use async_trait::async_trait;
use logicnet_types::{NodeName, NodeState, Rule};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{Result, ServiceError};
use crate::traits::RuleService;

#[derive(Debug, Clone)]
struct StoredNode {
    rule: Rule,
    state: NodeState,
    /// Creation sequence number. Every reference has a lower one.
    seq: u64,
}

#[derive(Debug, Default)]
struct Store {
    nodes: HashMap<NodeName, StoredNode>,
    next_seq: u64,
    dirty_since: Option<Instant>,
}

impl Store {
    fn touch(&mut self) {
        self.dirty_since = Some(Instant::now());
    }

    fn parents_of(&self, name: &NodeName) -> Vec<NodeName> {
        let mut parents: Vec<NodeName> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.rule.references_name(name))
            .map(|(parent, _)| parent.clone())
            .collect();
        parents.sort();
        parents
    }

    /// Re-derive every non-constant node in creation order.
    fn propagate(&mut self) {
        let mut order: Vec<(u64, NodeName)> = self
            .nodes
            .iter()
            .filter(|(_, node)| !node.rule.is_constant())
            .map(|(name, node)| (node.seq, name.clone()))
            .collect();
        order.sort();

        for (_, name) in order {
            let Some(rule) = self.nodes.get(&name).map(|n| n.rule.clone()) else {
                continue;
            };
            let value = rule.evaluate(|r| match self.nodes.get(r)?.state {
                NodeState::Active => Some(true),
                NodeState::Inactive => Some(false),
                NodeState::Pending => None,
            });
            if let Some(node) = self.nodes.get_mut(&name) {
                node.state = value.map(NodeState::from).unwrap_or(NodeState::Pending);
            }
        }
        self.dirty_since = None;
    }

    fn settle_if_due(&mut self, latency: Duration) {
        if let Some(since) = self.dirty_since {
            if since.elapsed() >= latency {
                self.propagate();
            }
        }
    }
}

/// In-memory rule service implementation.
pub struct InMemoryRuleService {
    store: RwLock<Store>,
    latency: Duration,
}

impl InMemoryRuleService {
    /// Create a service that converges on the next read.
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    /// Create a service that converges `latency` after the last write.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            latency,
        }
    }

    /// Whether a node exists.
    pub async fn contains(&self, name: &NodeName) -> bool {
        self.store.read().await.nodes.contains_key(name)
    }

    /// Number of stored nodes.
    pub async fn node_count(&self) -> usize {
        self.store.read().await.nodes.len()
    }

    /// All stored names, sorted.
    pub async fn names(&self) -> Vec<NodeName> {
        let mut names: Vec<NodeName> = self.store.read().await.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Rule a node was created with.
    pub async fn rule(&self, name: &NodeName) -> Option<Rule> {
        self.store.read().await.nodes.get(name).map(|n| n.rule.clone())
    }

    /// Re-derive every node now, regardless of latency.
    pub async fn settle_now(&self) {
        self.store.write().await.propagate();
    }
}

impl Default for InMemoryRuleService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuleService for InMemoryRuleService {
    async fn create_rule_node(&self, name: &NodeName, rule: &Rule) -> Result<()> {
        debug!(%name, %rule, "Creating node");
        let mut store = self.store.write().await;
        if store.nodes.contains_key(name) {
            return Err(ServiceError::AlreadyExists(name.clone()));
        }
        if let Some(missing) = rule
            .references()
            .into_iter()
            .find(|r| !store.nodes.contains_key(*r))
        {
            return Err(ServiceError::MissingReference {
                node: name.clone(),
                reference: missing.clone(),
            });
        }
        let state = match rule {
            Rule::Constant(value) => NodeState::from(*value),
            _ => NodeState::Pending,
        };
        let seq = store.next_seq;
        store.next_seq += 1;
        store.nodes.insert(
            name.clone(),
            StoredNode {
                rule: rule.clone(),
                state,
                seq,
            },
        );
        store.touch();
        Ok(())
    }

    async fn override_state(&self, name: &NodeName, value: bool) -> Result<()> {
        debug!(%name, value, "Setting state");
        let mut store = self.store.write().await;
        let node = store
            .nodes
            .get_mut(name)
            .ok_or_else(|| ServiceError::NotFound(name.clone()))?;
        node.state = NodeState::from(value);
        store.touch();
        Ok(())
    }

    async fn describe_states(&self, names: &[NodeName]) -> Result<Vec<(NodeName, NodeState)>> {
        debug!(count = names.len(), "Describing states");
        let mut store = self.store.write().await;
        store.settle_if_due(self.latency);
        let mut answered: Vec<(NodeName, NodeState)> = names
            .iter()
            .filter_map(|name| store.nodes.get(name).map(|n| (name.clone(), n.state)))
            .collect();
        answered.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(answered)
    }

    async fn query_children(&self, name: &NodeName) -> Result<Vec<NodeName>> {
        debug!(%name, "Finding children");
        let store = self.store.read().await;
        let node = store
            .nodes
            .get(name)
            .ok_or_else(|| ServiceError::NotFound(name.clone()))?;
        Ok(node.rule.references().into_iter().cloned().collect())
    }

    async fn query_parents(&self, name: &NodeName) -> Result<Vec<NodeName>> {
        debug!(%name, "Finding parents");
        let store = self.store.read().await;
        if !store.nodes.contains_key(name) {
            return Err(ServiceError::NotFound(name.clone()));
        }
        Ok(store.parents_of(name))
    }

    async fn delete_node(&self, name: &NodeName) -> Result<()> {
        debug!(%name, "Deleting node");
        let mut store = self.store.write().await;
        if !store.nodes.contains_key(name) {
            return Err(ServiceError::NotFound(name.clone()));
        }
        let parents = store.parents_of(name);
        if !parents.is_empty() {
            return Err(ServiceError::StillReferenced {
                node: name.clone(),
                parents,
            });
        }
        store.nodes.remove(name);
        store.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> NodeName {
        NodeName::new(s).unwrap()
    }

    async fn with_leaves(service: &InMemoryRuleService, names: &[&str]) {
        for name in names {
            service
                .create_rule_node(&n(name), &Rule::Constant(false))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn rule_must_reference_existing_nodes() {
        let service = InMemoryRuleService::new();
        with_leaves(&service, &["a"]).await;

        let err = service
            .create_rule_node(&n("p"), &Rule::And(n("a"), n("b")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::MissingReference { ref reference, .. } if reference == &n("b")
        ));
        assert!(!service.contains(&n("p")).await);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let service = InMemoryRuleService::new();
        with_leaves(&service, &["a"]).await;
        let err = service
            .create_rule_node(&n("a"), &Rule::Constant(true))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn referenced_node_cannot_be_deleted() {
        let service = InMemoryRuleService::new();
        with_leaves(&service, &["a", "b"]).await;
        service
            .create_rule_node(&n("p"), &Rule::Or(n("a"), n("b")))
            .await
            .unwrap();

        let err = service.delete_node(&n("a")).await.unwrap_err();
        assert!(matches!(err, ServiceError::StillReferenced { ref parents, .. } if parents == &vec![n("p")]));

        service.delete_node(&n("p")).await.unwrap();
        service.delete_node(&n("a")).await.unwrap();
        assert!(matches!(
            service.delete_node(&n("a")).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn children_and_parents() {
        let service = InMemoryRuleService::new();
        with_leaves(&service, &["a", "b"]).await;
        service
            .create_rule_node(&n("x"), &Rule::Xor(n("a"), n("b")))
            .await
            .unwrap();
        service
            .create_rule_node(&n("y"), &Rule::And(n("a"), n("x")))
            .await
            .unwrap();

        assert_eq!(service.query_children(&n("y")).await.unwrap(), vec![n("a"), n("x")]);
        assert_eq!(service.query_parents(&n("a")).await.unwrap(), vec![n("x"), n("y")]);
        assert!(service.query_parents(&n("y")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn answers_in_name_order_and_aligns_on_query() {
        let service = InMemoryRuleService::new();
        with_leaves(&service, &["a", "m", "z"]).await;
        service.override_state(&n("z"), true).await.unwrap();

        let requested = vec![n("z"), n("a"), n("m")];
        let raw = service.describe_states(&requested).await.unwrap();
        assert_eq!(raw[0].0, n("a"));

        let states = service.query_states(&requested).await.unwrap();
        assert_eq!(
            states,
            vec![NodeState::Active, NodeState::Inactive, NodeState::Inactive]
        );
    }

    #[tokio::test]
    async fn repeated_names_are_each_answered() {
        let service = InMemoryRuleService::new();
        with_leaves(&service, &["a", "b"]).await;
        service.override_state(&n("a"), true).await.unwrap();

        let states = service
            .query_states(&[n("a"), n("b"), n("a")])
            .await
            .unwrap();
        assert_eq!(
            states,
            vec![NodeState::Active, NodeState::Inactive, NodeState::Active]
        );
    }

    #[tokio::test]
    async fn missing_name_makes_read_inconsistent() {
        let service = InMemoryRuleService::new();
        with_leaves(&service, &["a"]).await;
        let err = service.query_states(&[n("a"), n("ghost")]).await.unwrap_err();
        assert!(matches!(err, ServiceError::InconsistentRead { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn derived_state_converges_after_latency() {
        let service = InMemoryRuleService::with_latency(Duration::from_secs(3));
        with_leaves(&service, &["a", "b"]).await;
        service
            .create_rule_node(&n("p"), &Rule::Or(n("a"), n("b")))
            .await
            .unwrap();

        let states = service.query_states(&[n("p")]).await.unwrap();
        assert_eq!(states, vec![NodeState::Pending]);

        tokio::time::advance(Duration::from_secs(3)).await;
        let states = service.query_states(&[n("p")]).await.unwrap();
        assert_eq!(states, vec![NodeState::Inactive]);

        service.override_state(&n("a"), true).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(
            service.query_states(&[n("p")]).await.unwrap(),
            vec![NodeState::Inactive]
        );
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(
            service.query_states(&[n("p")]).await.unwrap(),
            vec![NodeState::Active]
        );
    }

    #[tokio::test]
    async fn override_of_derived_node_is_not_durable() {
        let service = InMemoryRuleService::new();
        with_leaves(&service, &["a", "b"]).await;
        service
            .create_rule_node(&n("p"), &Rule::And(n("a"), n("b")))
            .await
            .unwrap();
        service.override_state(&n("p"), true).await.unwrap();

        // The override itself is a write, so the next read re-derives p.
        assert_eq!(
            service.query_states(&[n("p"), n("a")]).await.unwrap(),
            vec![NodeState::Inactive, NodeState::Inactive]
        );

        // Constant-rule leaves keep their override.
        service.override_state(&n("a"), true).await.unwrap();
        service.settle_now().await;
        assert_eq!(
            service.query_states(&[n("a")]).await.unwrap(),
            vec![NodeState::Active]
        );
    }
}
