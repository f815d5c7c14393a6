//! Build, teardown, traversal and read protocols shared by every circuit.
//!
//! - Creation is bottom-up: a rule's references exist before the rule.
//! - Deletion is top-down: every parent of a node is deleted before it.
//! - Reads are batched and re-aligned to request order.

use async_trait::async_trait;
use futures::future::try_join_all;
use logicnet_service::{RuleService, ServiceError};
use logicnet_types::{NodeName, Rule};
use std::collections::HashSet;
use std::io::Write;
use tracing::{debug, info};

use crate::blueprint::Blueprint;
use crate::error::{CircuitError, Direction, Result};

/// How a blueprint is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildStrategy {
    /// One node at a time, in blueprint order.
    #[default]
    Sequential,
    /// One dependency layer at a time, nodes within a layer concurrently.
    Layered,
}

/// Source of child/parent relations between nodes.
#[async_trait]
pub trait Topology: Send + Sync {
    /// Names referenced by the node's rule.
    async fn children(&self, name: &NodeName) -> Result<Vec<NodeName>>;

    /// Names of nodes whose rule references the node.
    async fn parents(&self, name: &NodeName) -> Result<Vec<NodeName>>;
}

/// Topology answered by the rule service.
pub struct ServiceTopology<'a>(pub &'a dyn RuleService);

#[async_trait]
impl Topology for ServiceTopology<'_> {
    async fn children(&self, name: &NodeName) -> Result<Vec<NodeName>> {
        self.0
            .query_children(name)
            .await
            .map_err(|source| CircuitError::Traverse {
                name: name.clone(),
                direction: Direction::Children,
                source,
            })
    }

    async fn parents(&self, name: &NodeName) -> Result<Vec<NodeName>> {
        self.0
            .query_parents(name)
            .await
            .map_err(|source| CircuitError::Traverse {
                name: name.clone(),
                direction: Direction::Parents,
                source,
            })
    }
}

#[async_trait]
impl Topology for Blueprint {
    async fn children(&self, name: &NodeName) -> Result<Vec<NodeName>> {
        Ok(Blueprint::children(self, name))
    }

    async fn parents(&self, name: &NodeName) -> Result<Vec<NodeName>> {
        Ok(Blueprint::parents(self, name).to_vec())
    }
}

/// Create one node, wrapping failures with the node and its rule.
pub async fn create_node(service: &dyn RuleService, name: &NodeName, rule: &Rule) -> Result<()> {
    service
        .create_rule_node(name, rule)
        .await
        .map_err(|source| CircuitError::Create {
            name: name.clone(),
            rule: rule.to_string(),
            source,
        })
}

/// Create every node of a blueprint. Stops at the first failure and leaves
/// already-created nodes in place.
pub async fn build(
    service: &dyn RuleService,
    blueprint: &Blueprint,
    strategy: BuildStrategy,
) -> Result<()> {
    blueprint.validate()?;
    match strategy {
        BuildStrategy::Sequential => {
            for (name, rule) in blueprint.nodes() {
                create_node(service, name, rule).await?;
            }
        }
        BuildStrategy::Layered => {
            for (depth, layer) in blueprint.layers().into_iter().enumerate() {
                debug!(depth, nodes = layer.len(), "Creating layer");
                try_join_all(
                    layer
                        .into_iter()
                        .map(|(name, rule)| create_node(service, name, rule)),
                )
                .await?;
            }
        }
    }
    Ok(())
}

/// Delete one node.
pub async fn delete_node(service: &dyn RuleService, name: &NodeName) -> Result<()> {
    service
        .delete_node(name)
        .await
        .map_err(|source| CircuitError::Delete {
            name: name.clone(),
            source,
        })
}

/// Delete exactly the nodes of a blueprint, in reverse creation order.
pub async fn teardown(service: &dyn RuleService, blueprint: &Blueprint) -> Result<()> {
    for name in blueprint.removal_order() {
        delete_node(service, &name).await?;
    }
    Ok(())
}

/// Delete every root and, before each node, every node that references it,
/// transitively.
///
/// One visited-set spans all roots, so a node shared by several roots is
/// deleted once. Returns the names in deletion order.
pub async fn remove_upward(
    service: &dyn RuleService,
    topology: &dyn Topology,
    roots: &[NodeName],
) -> Result<Vec<NodeName>> {
    walk_upward(topology, roots, Some(service)).await
}

/// Order in which [`remove_upward`] would delete, without deleting.
pub async fn removal_plan(topology: &dyn Topology, roots: &[NodeName]) -> Result<Vec<NodeName>> {
    walk_upward(topology, roots, None).await
}

enum Frame {
    Expand(NodeName),
    Delete(NodeName),
}

async fn walk_upward(
    topology: &dyn Topology,
    roots: &[NodeName],
    service: Option<&dyn RuleService>,
) -> Result<Vec<NodeName>> {
    let mut removed: HashSet<NodeName> = HashSet::new();
    let mut order = Vec::new();

    for root in roots {
        let mut stack = vec![Frame::Expand(root.clone())];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Expand(name) => {
                    if removed.contains(&name) {
                        continue;
                    }
                    let parents = topology.parents(&name).await?;
                    stack.push(Frame::Delete(name));
                    // Reversed so the first parent is handled first.
                    for parent in parents.into_iter().rev() {
                        if !removed.contains(&parent) {
                            stack.push(Frame::Expand(parent));
                        }
                    }
                }
                Frame::Delete(name) => {
                    if !removed.insert(name.clone()) {
                        continue;
                    }
                    if let Some(service) = service {
                        delete_node(service, &name).await?;
                    }
                    order.push(name);
                }
            }
        }
    }
    Ok(order)
}

/// Result of walking a circuit from its outputs toward its inputs.
#[derive(Debug, Clone, Default)]
pub struct GraphTrace {
    /// `(child, parent)` pairs: data flows from child to parent.
    pub edges: Vec<(NodeName, NodeName)>,
    /// Nodes whose children were queried, in visiting order.
    pub visited: Vec<NodeName>,
}

/// Depth-first walk from `outputs` toward children, querying each node once.
pub async fn trace_graph(topology: &dyn Topology, outputs: &[NodeName]) -> Result<GraphTrace> {
    let mut trace = GraphTrace::default();
    let mut seen: HashSet<NodeName> = HashSet::new();
    let mut stack: Vec<NodeName> = outputs.to_vec();

    while let Some(parent) = stack.pop() {
        if !seen.insert(parent.clone()) {
            continue;
        }
        let children = topology.children(&parent).await?;
        for child in children {
            if !seen.contains(&child) {
                stack.push(child.clone());
            }
            trace.edges.push((child, parent.clone()));
        }
        trace.visited.push(parent);
    }
    Ok(trace)
}

/// Write edges as a directed graph readable by graphviz tools.
pub fn write_dot<W: Write>(w: &mut W, edges: &[(NodeName, NodeName)]) -> Result<()> {
    writeln!(w, "digraph {{")?;
    for (child, parent) in edges {
        writeln!(w, "\t{:?} -> {:?};", child.as_str(), parent.as_str())?;
    }
    writeln!(w, "}}")?;
    Ok(())
}

/// Force the state of each named node, in order.
pub async fn set_states(service: &dyn RuleService, assignments: &[(&NodeName, bool)]) -> Result<()> {
    for (name, value) in assignments {
        service
            .override_state(name, *value)
            .await
            .map_err(|source| CircuitError::Override {
                name: (*name).clone(),
                value: *value,
                source,
            })?;
    }
    Ok(())
}

/// Read the named nodes in one batch; active reads as true.
pub async fn read_states(service: &dyn RuleService, names: &[NodeName]) -> Result<Vec<bool>> {
    let states = service.query_states(names).await.map_err(|e| match e {
        ServiceError::InconsistentRead {
            requested,
            returned,
        } => CircuitError::InconsistentRead {
            requested,
            returned,
        },
        source => CircuitError::Read {
            count: names.len(),
            source,
        },
    })?;
    Ok(states.into_iter().map(|s| s.is_active()).collect())
}

/// Log the outcome of a build.
pub(crate) fn log_built(kind: &str, name: &NodeName, blueprint: &Blueprint) {
    info!(kind, %name, nodes = blueprint.len(), "Circuit built");
}
