//! Half adder: carry and sum of two input nodes.

use logicnet_service::RuleService;
use logicnet_types::{NodeName, Rule};
use std::sync::Arc;

use crate::blueprint::Blueprint;
use crate::engine::{self, BuildStrategy};
use crate::error::Result;

/// Half adder over two existing input nodes.
///
/// Owns `cout:ha:<name>` (AND of the inputs) and `sout:ha:<name>` (XOR of
/// the inputs). The inputs belong to the caller.
#[derive(Clone)]
pub struct HalfAdder {
    service: Arc<dyn RuleService>,
    name: NodeName,
    left_in: NodeName,
    right_in: NodeName,
}

impl HalfAdder {
    /// Fails if `name` is too long for the output names derived from it.
    pub fn new(
        service: Arc<dyn RuleService>,
        name: NodeName,
        left_in: NodeName,
        right_in: NodeName,
    ) -> Result<Self> {
        let ha = Self::assemble(service, name, left_in, right_in);
        ha.blueprint().check_names()?;
        Ok(ha)
    }

    /// Wire up without checking names; the enclosing circuit checks them.
    pub(crate) fn assemble(
        service: Arc<dyn RuleService>,
        name: NodeName,
        left_in: NodeName,
        right_in: NodeName,
    ) -> Self {
        Self {
            service,
            name,
            left_in,
            right_in,
        }
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    pub fn left_in(&self) -> &NodeName {
        &self.left_in
    }

    pub fn right_in(&self) -> &NodeName {
        &self.right_in
    }

    pub fn carry_out_name(&self) -> NodeName {
        NodeName::derived("cout", "ha", &self.name)
    }

    pub fn sum_out_name(&self) -> NodeName {
        NodeName::derived("sout", "ha", &self.name)
    }

    /// Owned nodes: carry out, then sum out.
    pub fn blueprint(&self) -> Blueprint {
        let mut bp = Blueprint::new();
        bp.push(
            self.carry_out_name(),
            Rule::And(self.left_in.clone(), self.right_in.clone()),
        );
        bp.push(
            self.sum_out_name(),
            Rule::Xor(self.left_in.clone(), self.right_in.clone()),
        );
        bp
    }

    /// Create the output nodes. The inputs must exist.
    pub async fn build(&self) -> Result<()> {
        let bp = self.blueprint();
        engine::build(self.service.as_ref(), &bp, BuildStrategy::Sequential).await?;
        engine::log_built("half adder", &self.name, &bp);
        Ok(())
    }

    /// Delete the output nodes.
    pub async fn remove(&self) -> Result<()> {
        engine::teardown(self.service.as_ref(), &self.blueprint()).await
    }

    pub async fn set_inputs(&self, left: bool, right: bool) -> Result<()> {
        engine::set_states(
            self.service.as_ref(),
            &[(&self.left_in, left), (&self.right_in, right)],
        )
        .await
    }

    /// Read `(carry, sum)`.
    pub async fn read_outputs(&self) -> Result<(bool, bool)> {
        let names = [self.carry_out_name(), self.sum_out_name()];
        let bits = engine::read_states(self.service.as_ref(), &names).await?;
        Ok((bits[0], bits[1]))
    }
}
