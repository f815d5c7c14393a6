//! 8-bit ripple-carry adder.
//!
//! Eight full adders chained through their carries. The adder owns its
//! sixteen input leaves and a constant-false ground that feeds the first
//! carry in; the last carry out is the overflow flag.

use logicnet_service::RuleService;
use logicnet_types::{NodeName, Register, Rule, REGISTER_WIDTH};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

use crate::blueprint::Blueprint;
use crate::engine::{self, BuildStrategy, GraphTrace, ServiceTopology};
use crate::error::Result;
use crate::full_adder::{self, FullAdder};

/// 8-bit ripple-carry adder named `name`.
#[derive(Clone)]
pub struct RippleCarryAdder {
    service: Arc<dyn RuleService>,
    name: NodeName,
    ground: NodeName,
    left_in: [NodeName; REGISTER_WIDTH],
    right_in: [NodeName; REGISTER_WIDTH],
    adders: [FullAdder; REGISTER_WIDTH],
}

impl RippleCarryAdder {
    /// Fails if `name` is too long for the node names derived from it. The
    /// longest, `sout:ha:ha2:fa:adder7:rca:<name>`, adds 26 characters.
    pub fn new(service: Arc<dyn RuleService>, name: NodeName) -> Result<Self> {
        let rca = Self::assemble(service, name);
        rca.blueprint().check_names()?;
        Ok(rca)
    }

    fn assemble(service: Arc<dyn RuleService>, name: NodeName) -> Self {
        let ground = NodeName::derived("ground", "rca", &name);
        let left_in: [NodeName; REGISTER_WIDTH] =
            std::array::from_fn(|i| NodeName::derived(format!("lin{}", i), "rca", &name));
        let right_in: [NodeName; REGISTER_WIDTH] =
            std::array::from_fn(|i| NodeName::derived(format!("rin{}", i), "rca", &name));
        let adder_names: [NodeName; REGISTER_WIDTH] =
            std::array::from_fn(|i| NodeName::derived(format!("adder{}", i), "rca", &name));

        let adders = std::array::from_fn(|i| {
            let carry_in = match i {
                0 => ground.clone(),
                _ => full_adder::carry_out_name(&adder_names[i - 1]),
            };
            FullAdder::assemble(
                service.clone(),
                adder_names[i].clone(),
                left_in[i].clone(),
                right_in[i].clone(),
                carry_in,
            )
        });

        Self {
            service,
            name,
            ground,
            left_in,
            right_in,
            adders,
        }
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    pub fn ground_name(&self) -> &NodeName {
        &self.ground
    }

    pub fn left_in(&self, i: usize) -> &NodeName {
        &self.left_in[i]
    }

    pub fn right_in(&self, i: usize) -> &NodeName {
        &self.right_in[i]
    }

    pub fn adder(&self, i: usize) -> &FullAdder {
        &self.adders[i]
    }

    pub fn sum_out_name(&self, i: usize) -> NodeName {
        self.adders[i].sum_out_name()
    }

    pub fn overflow_name(&self) -> NodeName {
        self.adders[REGISTER_WIDTH - 1].carry_out_name()
    }

    /// The eight sum bits, least significant first, then the overflow.
    pub fn output_names(&self) -> Vec<NodeName> {
        let mut names: Vec<NodeName> = self.adders.iter().map(FullAdder::sum_out_name).collect();
        names.push(self.overflow_name());
        names
    }

    /// The sixteen input leaves, interleaved per bit, then the ground.
    pub fn leaf_names(&self) -> Vec<NodeName> {
        let mut names: Vec<NodeName> = self
            .left_in
            .iter()
            .zip(&self.right_in)
            .flat_map(|(l, r)| [l.clone(), r.clone()])
            .collect();
        names.push(self.ground.clone());
        names
    }

    /// Every owned node in creation order: the ground, then per bit the two
    /// leaves and the full adder.
    pub fn blueprint(&self) -> Blueprint {
        let mut bp = Blueprint::new();
        bp.push(self.ground.clone(), Rule::Constant(false));
        for (i, adder) in self.adders.iter().enumerate() {
            bp.push(self.left_in[i].clone(), Rule::Constant(false));
            bp.push(self.right_in[i].clone(), Rule::Constant(false));
            bp.extend(adder.blueprint());
        }
        bp
    }

    pub async fn build(&self) -> Result<()> {
        self.build_with(BuildStrategy::Sequential).await
    }

    pub async fn build_with(&self, strategy: BuildStrategy) -> Result<()> {
        let bp = self.blueprint();
        engine::build(self.service.as_ref(), &bp, strategy).await?;
        engine::log_built("ripple-carry adder", &self.name, &bp);
        Ok(())
    }

    /// Override the sixteen input leaves. The ground is left alone.
    pub async fn set_inputs(&self, left: Register, right: Register) -> Result<()> {
        let mut assignments = Vec::with_capacity(2 * REGISTER_WIDTH);
        for i in 0..REGISTER_WIDTH {
            assignments.push((&self.left_in[i], left.bit(i)));
            assignments.push((&self.right_in[i], right.bit(i)));
        }
        engine::set_states(self.service.as_ref(), &assignments).await
    }

    /// Read the sum and the overflow flag in one batch.
    pub async fn read_outputs(&self) -> Result<(Register, bool)> {
        let states = engine::read_states(self.service.as_ref(), &self.output_names()).await?;
        let mut bits = [false; REGISTER_WIDTH];
        bits.copy_from_slice(&states[..REGISTER_WIDTH]);
        Ok((Register::from_bits(bits), states[REGISTER_WIDTH]))
    }

    /// Delete every node reachable upward from the leaves, the leaves
    /// included. Relations are queried from the service, so nodes other
    /// circuits hang off these leaves are deleted too.
    pub async fn remove(&self) -> Result<Vec<NodeName>> {
        let topology = ServiceTopology(self.service.as_ref());
        let deleted =
            engine::remove_upward(self.service.as_ref(), &topology, &self.leaf_names()).await?;
        info!(name = %self.name, nodes = deleted.len(), "Circuit removed");
        Ok(deleted)
    }

    /// Walk the live graph from the outputs toward the leaves.
    pub async fn trace(&self) -> Result<GraphTrace> {
        let topology = ServiceTopology(self.service.as_ref());
        engine::trace_graph(&topology, &self.output_names()).await
    }

    /// Write the live graph in dot format.
    pub async fn save_graph<W: Write>(&self, w: &mut W) -> Result<()> {
        let trace = self.trace().await?;
        engine::write_dot(w, &trace.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logicnet_service::InMemoryRuleService;

    fn adder() -> RippleCarryAdder {
        RippleCarryAdder::new(
            Arc::new(InMemoryRuleService::new()),
            NodeName::new("test").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn chains_carries() {
        let rca = adder();
        assert_eq!(rca.adder(0).carry_in(), rca.ground_name());
        for i in 1..REGISTER_WIDTH {
            assert_eq!(
                rca.adder(i).carry_in(),
                &rca.adder(i - 1).carry_out_name()
            );
        }
        assert_eq!(rca.overflow_name().as_str(), "cout:fa:adder7:rca:test");
        assert_eq!(rca.left_in(3).as_str(), "lin3:rca:test");
        assert_eq!(rca.right_in(3).as_str(), "rin3:rca:test");
    }

    #[test]
    fn blueprint_is_closed_and_ordered() {
        let bp = adder().blueprint();
        // ground + 8 * (2 leaves + 5 full adder nodes)
        assert_eq!(bp.len(), 1 + 8 * 7);
        assert!(bp.external_references().is_empty());
        assert!(bp.validate().is_ok());
        assert_eq!(bp.creation_order()[0].as_str(), "ground:rca:test");
    }

    #[test]
    fn longest_derived_name_bounds_the_circuit_name() {
        let service: Arc<dyn RuleService> = Arc::new(InMemoryRuleService::new());
        let named = |len: usize| {
            RippleCarryAdder::new(service.clone(), NodeName::new("x".repeat(len)).unwrap())
        };

        let rca = named(229).unwrap();
        assert_eq!(rca.sum_out_name(7).as_str().len(), 255);
        assert!(matches!(
            named(230),
            Err(crate::error::CircuitError::Name(
                logicnet_types::NameError::TooLong { len: 256, .. }
            ))
        ));
    }

    #[test]
    fn outputs_are_sums_then_overflow() {
        let names = adder().output_names();
        assert_eq!(names.len(), 9);
        assert_eq!(names[0].as_str(), "sout:ha:ha2:fa:adder0:rca:test");
        assert_eq!(names[8].as_str(), "cout:fa:adder7:rca:test");
    }
}
