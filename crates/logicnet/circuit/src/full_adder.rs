//! Full adder built from two half adders.

use logicnet_service::RuleService;
use logicnet_types::{NodeName, Rule};
use std::sync::Arc;

use crate::blueprint::Blueprint;
use crate::engine::{self, BuildStrategy};
use crate::error::Result;
use crate::half_adder::HalfAdder;

/// Full adder over three existing input nodes.
///
/// - `ha1:fa:<name>` adds left and right.
/// - `ha2:fa:<name>` adds the first sum and the carry in; its sum is the
///   full adder's sum.
/// - `cout:fa:<name>` is the OR of both half adders' carries.
#[derive(Clone)]
pub struct FullAdder {
    service: Arc<dyn RuleService>,
    name: NodeName,
    ha1: HalfAdder,
    ha2: HalfAdder,
    carry_in: NodeName,
}

impl FullAdder {
    /// Fails if `name` is too long for the node names derived from it.
    pub fn new(
        service: Arc<dyn RuleService>,
        name: NodeName,
        left_in: NodeName,
        right_in: NodeName,
        carry_in: NodeName,
    ) -> Result<Self> {
        let fa = Self::assemble(service, name, left_in, right_in, carry_in);
        fa.blueprint().check_names()?;
        Ok(fa)
    }

    /// Wire up without checking names; the enclosing circuit checks them.
    pub(crate) fn assemble(
        service: Arc<dyn RuleService>,
        name: NodeName,
        left_in: NodeName,
        right_in: NodeName,
        carry_in: NodeName,
    ) -> Self {
        let ha1 = HalfAdder::assemble(
            service.clone(),
            NodeName::derived("ha1", "fa", &name),
            left_in,
            right_in,
        );
        let ha2 = HalfAdder::assemble(
            service.clone(),
            NodeName::derived("ha2", "fa", &name),
            ha1.sum_out_name(),
            carry_in.clone(),
        );
        Self {
            service,
            name,
            ha1,
            ha2,
            carry_in,
        }
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    pub fn left_in(&self) -> &NodeName {
        self.ha1.left_in()
    }

    pub fn right_in(&self) -> &NodeName {
        self.ha1.right_in()
    }

    pub fn carry_in(&self) -> &NodeName {
        &self.carry_in
    }

    pub fn carry_out_name(&self) -> NodeName {
        carry_out_name(&self.name)
    }

    pub fn sum_out_name(&self) -> NodeName {
        self.ha2.sum_out_name()
    }

    /// Owned nodes: both half adders, then the carry out.
    pub fn blueprint(&self) -> Blueprint {
        let mut bp = self.ha1.blueprint();
        bp.extend(self.ha2.blueprint());
        bp.push(
            self.carry_out_name(),
            Rule::Or(self.ha1.carry_out_name(), self.ha2.carry_out_name()),
        );
        bp
    }

    /// Create every owned node. The inputs must exist.
    pub async fn build(&self) -> Result<()> {
        self.build_with(BuildStrategy::Sequential).await
    }

    pub async fn build_with(&self, strategy: BuildStrategy) -> Result<()> {
        let bp = self.blueprint();
        engine::build(self.service.as_ref(), &bp, strategy).await?;
        engine::log_built("full adder", &self.name, &bp);
        Ok(())
    }

    /// Delete every owned node.
    pub async fn remove(&self) -> Result<()> {
        engine::teardown(self.service.as_ref(), &self.blueprint()).await
    }

    /// Set left and right, leaving the carry in alone.
    pub async fn set_main_inputs(&self, left: bool, right: bool) -> Result<()> {
        self.ha1.set_inputs(left, right).await
    }

    pub async fn set_inputs(&self, left: bool, right: bool, carry: bool) -> Result<()> {
        self.set_main_inputs(left, right).await?;
        engine::set_states(self.service.as_ref(), &[(&self.carry_in, carry)]).await
    }

    /// Read `(carry, sum)`.
    pub async fn read_outputs(&self) -> Result<(bool, bool)> {
        let names = [self.carry_out_name(), self.sum_out_name()];
        let bits = engine::read_states(self.service.as_ref(), &names).await?;
        Ok((bits[0], bits[1]))
    }
}

/// Carry-out name of the full adder called `name`.
pub(crate) fn carry_out_name(name: &NodeName) -> NodeName {
    NodeName::derived("cout", "fa", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logicnet_service::InMemoryRuleService;

    fn n(s: &str) -> NodeName {
        NodeName::new(s).unwrap()
    }

    #[test]
    fn wires_second_half_adder_to_first_sum() {
        let fa = FullAdder::new(
            Arc::new(InMemoryRuleService::new()),
            n("test"),
            n("l"),
            n("r"),
            n("c"),
        )
        .unwrap();
        assert_eq!(fa.sum_out_name().as_str(), "sout:ha:ha2:fa:test");
        assert_eq!(fa.carry_out_name().as_str(), "cout:fa:test");

        let bp = fa.blueprint();
        assert_eq!(bp.len(), 5);
        assert_eq!(
            bp.children(&n("sout:ha:ha2:fa:test")),
            vec![n("sout:ha:ha1:fa:test"), n("c")]
        );
        assert_eq!(
            bp.children(&n("cout:fa:test")),
            vec![n("cout:ha:ha1:fa:test"), n("cout:ha:ha2:fa:test")]
        );
        assert!(bp.validate().is_ok());
    }
}
