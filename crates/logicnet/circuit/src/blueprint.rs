//! Local mirror of a circuit's dependency graph.
//!
//! A [`Blueprint`] lists the nodes a circuit owns in creation order, together
//! with their rules. Children and parents are answered from in-memory maps,
//! so creation order, removal order and the circuit graph can be computed
//! without a service.

use logicnet_types::{NodeName, Rule};
use std::collections::{BTreeSet, HashMap};

use crate::error::{CircuitError, Result};

/// Owned nodes of a circuit, in creation order.
#[derive(Debug, Clone, Default)]
pub struct Blueprint {
    nodes: Vec<(NodeName, Rule)>,
    index: HashMap<NodeName, usize>,
    parents: HashMap<NodeName, Vec<NodeName>>,
}

impl Blueprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node. It is created after every node pushed before it.
    pub fn push(&mut self, name: NodeName, rule: Rule) {
        for reference in rule.references() {
            self.parents
                .entry(reference.clone())
                .or_default()
                .push(name.clone());
        }
        self.index.entry(name.clone()).or_insert(self.nodes.len());
        self.nodes.push((name, rule));
    }

    /// Append every node of another blueprint, keeping its order.
    pub fn extend(&mut self, other: Blueprint) {
        for (name, rule) in other.nodes {
            self.push(name, rule);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &NodeName) -> bool {
        self.index.contains_key(name)
    }

    pub fn rule(&self, name: &NodeName) -> Option<&Rule> {
        self.index.get(name).map(|&i| &self.nodes[i].1)
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeName, &Rule)> {
        self.nodes.iter().map(|(n, r)| (n, r))
    }

    /// Names in creation order.
    pub fn creation_order(&self) -> Vec<NodeName> {
        self.nodes.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Names in an order the service accepts deletions in.
    pub fn removal_order(&self) -> Vec<NodeName> {
        self.nodes.iter().rev().map(|(n, _)| n.clone()).collect()
    }

    /// Names referenced by a node's rule. Empty for unknown names.
    pub fn children(&self, name: &NodeName) -> Vec<NodeName> {
        self.rule(name)
            .map(|rule| rule.references().into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Owned nodes whose rule references `name`. `name` may be an input.
    pub fn parents(&self, name: &NodeName) -> &[NodeName] {
        self.parents.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Referenced names the blueprint does not own: the circuit's inputs.
    pub fn external_references(&self) -> BTreeSet<NodeName> {
        self.nodes
            .iter()
            .flat_map(|(_, rule)| rule.references())
            .filter(|r| !self.contains(r))
            .cloned()
            .collect()
    }

    /// Check that every owned name is one the service accepts.
    pub fn check_names(&self) -> Result<()> {
        for (name, _) in &self.nodes {
            NodeName::new(name.as_str())?;
        }
        Ok(())
    }

    /// Check that names are valid and unique and that every owned node is
    /// created after the owned nodes its rule references.
    pub fn validate(&self) -> Result<()> {
        self.check_names()?;
        if self.index.len() != self.nodes.len() {
            let mut seen = BTreeSet::new();
            let duplicate = self
                .nodes
                .iter()
                .find(|(n, _)| !seen.insert(n))
                .map(|(n, _)| n.to_string())
                .unwrap_or_default();
            return Err(CircuitError::Blueprint(format!(
                "{} is listed more than once",
                duplicate
            )));
        }
        for (position, (name, rule)) in self.nodes.iter().enumerate() {
            for reference in rule.references() {
                if let Some(&at) = self.index.get(reference) {
                    if at >= position {
                        return Err(CircuitError::Blueprint(format!(
                            "{} is created before {}, which it references",
                            name, reference
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Group nodes into layers that can each be created concurrently.
    ///
    /// A node's layer is one more than the deepest owned node it references;
    /// nodes that reference only inputs (or nothing) form layer 0.
    pub fn layers(&self) -> Vec<Vec<(&NodeName, &Rule)>> {
        let mut depth: HashMap<&NodeName, usize> = HashMap::new();
        let mut layers: Vec<Vec<(&NodeName, &Rule)>> = Vec::new();
        for (name, rule) in &self.nodes {
            let d = rule
                .references()
                .into_iter()
                .filter_map(|r| depth.get(r).map(|d| d + 1))
                .max()
                .unwrap_or(0);
            depth.insert(name, d);
            if layers.len() <= d {
                layers.resize_with(d + 1, Vec::new);
            }
            layers[d].push((name, rule));
        }
        layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> NodeName {
        NodeName::new(s).unwrap()
    }

    fn diamond() -> Blueprint {
        let mut bp = Blueprint::new();
        bp.push(n("x"), Rule::And(n("in1"), n("in2")));
        bp.push(n("y"), Rule::Xor(n("in1"), n("in2")));
        bp.push(n("z"), Rule::Or(n("x"), n("y")));
        bp
    }

    #[test]
    fn answers_children_and_parents() {
        let bp = diamond();
        assert_eq!(bp.children(&n("z")), vec![n("x"), n("y")]);
        assert_eq!(bp.parents(&n("in1")), &[n("x"), n("y")]);
        assert_eq!(bp.parents(&n("x")), &[n("z")]);
        assert!(bp.parents(&n("z")).is_empty());
        assert!(bp.children(&n("in1")).is_empty());
    }

    #[test]
    fn external_references_are_the_inputs() {
        let inputs: Vec<NodeName> = diamond().external_references().into_iter().collect();
        assert_eq!(inputs, vec![n("in1"), n("in2")]);
    }

    #[test]
    fn removal_is_reverse_creation() {
        let bp = diamond();
        assert_eq!(bp.creation_order(), vec![n("x"), n("y"), n("z")]);
        assert_eq!(bp.removal_order(), vec![n("z"), n("y"), n("x")]);
    }

    #[test]
    fn layers_group_independent_nodes() {
        let bp = diamond();
        let layers = bp.layers();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].len(), 2);
        assert_eq!(layers[1][0].0, &n("z"));
    }

    #[test]
    fn validate_rejects_forward_references() {
        let mut bp = Blueprint::new();
        bp.push(n("z"), Rule::Or(n("x"), n("in")));
        bp.push(n("x"), Rule::Constant(false));
        assert!(matches!(bp.validate(), Err(CircuitError::Blueprint(_))));
        assert!(diamond().validate().is_ok());
    }

    #[test]
    fn validate_rejects_overlong_names() {
        let owner = n(&"x".repeat(250));
        let mut bp = Blueprint::new();
        bp.push(NodeName::derived("cout", "ha", &owner), Rule::Constant(false));
        assert!(matches!(
            bp.check_names(),
            Err(CircuitError::Name(logicnet_types::NameError::TooLong { len: 258, .. }))
        ));
        assert!(matches!(bp.validate(), Err(CircuitError::Name(_))));
    }

    #[test]
    fn validate_rejects_duplicates() {
        let mut bp = diamond();
        bp.push(n("x"), Rule::Constant(true));
        let err = bp.validate().unwrap_err();
        assert!(err.to_string().contains("x is listed more than once"));
    }
}
