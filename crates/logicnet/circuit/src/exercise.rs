//! One addition driven through a built ripple-carry adder.

use logicnet_types::Register;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::error::Result;
use crate::ripple_carry::RippleCarryAdder;
use crate::settle::SettlePolicy;

/// Outcome of [`exercise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseReport {
    pub left: u8,
    pub right: u8,
    /// Sum read on the last attempt.
    pub sum: Register,
    /// Overflow read on the last attempt.
    pub overflow: bool,
    /// Reads performed, the successful one included.
    pub attempts: u32,
    /// Whether the last read matched the expected sum and overflow.
    pub converged: bool,
}

impl ExerciseReport {
    /// Wrapping sum of the operands.
    pub fn expected_sum(&self) -> u8 {
        self.left.wrapping_add(self.right)
    }

    pub fn expected_overflow(&self) -> bool {
        self.left.checked_add(self.right).is_none()
    }
}

/// Operands for one exercise, reproducible from `seed`.
pub fn random_operands(seed: u64) -> (u8, u8) {
    let mut rng = StdRng::seed_from_u64(seed);
    (rng.gen(), rng.gen())
}

/// Set `left` and `right` as inputs, wait, and read until the outputs show
/// the right answer or `policy.max_attempts` reads have been made.
///
/// Not converging is reported, not returned as an error.
pub async fn exercise(
    rca: &RippleCarryAdder,
    left: u8,
    right: u8,
    policy: &SettlePolicy,
) -> Result<ExerciseReport> {
    let want = left.wrapping_add(right);
    let want_overflow = left.checked_add(right).is_none();
    info!("Want to add {} and {} and get {}", left, right, want);

    info!("Setting inputs.");
    let (a, b) = (Register::from(left), Register::from(right));
    rca.set_inputs(a, b).await?;

    info!("Sleeping.");
    policy.settle().await;

    info!("Reading outputs.");
    info!("  a = {} ({})", a, left);
    info!("  b = {} ({})", b, right);

    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;
    loop {
        attempts += 1;
        let (sum, overflow) = rca.read_outputs().await?;
        if overflow {
            warn!("The computation overflowed.");
        }
        info!("sum = {} ({})", sum, sum.value());

        let converged = sum.value() == want && overflow == want_overflow;
        if converged {
            info!(attempts, "STATUS: Success at attempt {}.", attempts);
        } else if attempts >= max_attempts {
            warn!(
                attempts,
                "STATUS: Failed!!! Because {} != {}.",
                sum.value(),
                want
            );
        } else {
            policy.back_off().await;
            continue;
        }

        return Ok(ExerciseReport {
            left,
            right,
            sum,
            overflow,
            attempts,
            converged,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operands_are_reproducible() {
        assert_eq!(random_operands(42), random_operands(42));
        let distinct = (0..16)
            .map(random_operands)
            .collect::<std::collections::HashSet<_>>();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn expectations_wrap() {
        let report = ExerciseReport {
            left: 200,
            right: 100,
            sum: Register::from(44),
            overflow: true,
            attempts: 1,
            converged: true,
        };
        assert_eq!(report.expected_sum(), 44);
        assert!(report.expected_overflow());
    }
}
