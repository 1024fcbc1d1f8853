//! The common `SelectionStrategy` contract shared by all policies.
//!
//! Every policy is stateless with respect to anything but its explicit
//! arguments: learned per-arm state lives in the [`ArmRegistry`], randomness
//! comes in as a seeded `StdRng`, and both `select` and `update` are plain
//! functions of what they are handed. That keeps runs reproducible and lets
//! one strategy value drive many independent replicas.

use rand::rngs::StdRng;

use crate::arm::{ArmRegistry, ArmState};
use crate::error::BanditError;
use crate::TIEBREAK_EPS;

/// A bandit selection/update policy.
///
/// `update` receives the **pre-merge** registry alongside the pulled arm:
/// EXP3's weight exponent depends on the selection-time probability of the
/// chosen arm, which is a function of every arm's weight. Policies that only
/// maintain a running mean ignore the registry argument.
///
/// The `arm` handed to `update` has already been pulled, so its count is the
/// post-increment one the running-mean recurrence expects.
pub trait SelectionStrategy {
    /// Choose an arm from the registry.
    ///
    /// Fails with a configuration error on an empty registry. Deterministic
    /// variants break ties by registry iteration order (first arm wins).
    fn select(&self, registry: &ArmRegistry, rng: &mut StdRng) -> Result<String, BanditError>;

    /// Fold an observed reward into the pulled arm's state.
    fn update(
        &self,
        arm: ArmState,
        reward: f64,
        registry: &ArmRegistry,
    ) -> Result<ArmState, BanditError>;
}

/// Deterministic argmax over registry order.
///
/// The first arm encountered wins ties (within [`TIEBREAK_EPS`]) — never
/// randomized, so selection stays reproducible without consuming RNG state.
pub(crate) fn argmax_by<F>(registry: &ArmRegistry, score: F) -> Result<String, BanditError>
where
    F: Fn(&ArmState) -> f64,
{
    let mut best: Option<(&ArmState, f64)> = None;
    for arm in registry.iter() {
        let s = score(arm);
        match best {
            Some((_, bs)) if s <= bs + TIEBREAK_EPS => {}
            _ => best = Some((arm, s)),
        }
    }
    best.map(|(a, _)| a.name().to_string())
        .ok_or(BanditError::EmptyRegistry)
}

/// Sample an index from a probability vector by CDF walk.
///
/// Falls through to the last index if accumulated float error leaves the
/// draw above the final partial sum.
pub(crate) fn sample_index(probs: &[f64], draw: f64) -> usize {
    let mut cdf = 0.0;
    for (i, p) in probs.iter().enumerate() {
        cdf += p;
        if draw < cdf {
            return i;
        }
    }
    probs.len().saturating_sub(1)
}
