//! UCB1: optimism in the face of uncertainty (Auer, Cesa-Bianchi & Fischer
//! 2002).
//!
//! Fully deterministic: no RNG is consumed. Each unpulled arm is treated as
//! having an infinite confidence bound, so cold start walks the registry in
//! order until every arm has been tried once; after that the policy takes
//! argmax of `value + sqrt(2 ln(total_pulls) / pulls)`. The zero-pull
//! short-circuit is what keeps `ln(0)` and division by zero out of the
//! bound entirely.

use rand::rngs::StdRng;

use crate::arm::{ArmRegistry, ArmState};
use crate::error::BanditError;
use crate::strategy::{argmax_by, SelectionStrategy};

/// The parameter-free UCB1 policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ucb1;

impl Ucb1 {
    pub fn new() -> Self {
        Self
    }

    /// The exploration bound for `arm` given the registry's total pull count.
    ///
    /// Infinite for unpulled arms.
    pub fn bound(arm: &ArmState, total_pulls: u64) -> f64 {
        if arm.pulls() == 0 {
            return f64::INFINITY;
        }
        (2.0 * (total_pulls as f64).ln() / arm.pulls() as f64).sqrt()
    }
}

impl SelectionStrategy for Ucb1 {
    fn select(&self, registry: &ArmRegistry, _rng: &mut StdRng) -> Result<String, BanditError> {
        if registry.is_empty() {
            return Err(BanditError::EmptyRegistry);
        }
        // Cold start: first unpulled arm in registry order.
        if let Some(arm) = registry.unpulled().next() {
            return Ok(arm.name().to_string());
        }
        let total = registry.total_pulls();
        argmax_by(registry, |a| a.value() + Self::bound(a, total))
    }

    fn update(
        &self,
        arm: ArmState,
        reward: f64,
        _registry: &ArmRegistry,
    ) -> Result<ArmState, BanditError> {
        Ok(arm.apply_reward(reward))
    }
}
