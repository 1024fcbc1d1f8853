//! Epsilon-greedy: explore uniformly with probability epsilon, else exploit.
//!
//! The simplest exploration/exploitation tradeoff: a coin flip decides
//! between a uniform-random arm and the current best running mean. With
//! `epsilon = 0` it degenerates to pure greedy argmax, which is the useful
//! baseline in convergence tests.

use rand::rngs::StdRng;
use rand::Rng;

use crate::arm::{ArmRegistry, ArmState};
use crate::error::BanditError;
use crate::strategy::{argmax_by, SelectionStrategy};

/// Epsilon-greedy policy with a fixed exploration rate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpsilonGreedy {
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Create with exploration rate `epsilon` in `[0, 1]`.
    pub fn new(epsilon: f64) -> Result<Self, BanditError> {
        if !epsilon.is_finite() || !(0.0..=1.0).contains(&epsilon) {
            return Err(BanditError::ParameterOutOfRange {
                name: "epsilon",
                value: epsilon,
                constraint: "0 <= epsilon <= 1",
            });
        }
        Ok(Self { epsilon })
    }

    /// The configured exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl SelectionStrategy for EpsilonGreedy {
    fn select(&self, registry: &ArmRegistry, rng: &mut StdRng) -> Result<String, BanditError> {
        if registry.is_empty() {
            return Err(BanditError::EmptyRegistry);
        }
        if rng.random::<f64>() < self.epsilon {
            let i = rng.random_range(0..registry.len());
            return Ok(registry.names()[i].clone());
        }
        argmax_by(registry, ArmState::value)
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
