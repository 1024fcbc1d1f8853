//! Softmax (Boltzmann) exploration: sample arms in proportion to
//! `exp(value / temperature)`.
//!
//! Temperature controls sharpness: high temperatures flatten toward uniform,
//! low temperatures approach greedy argmax. The normalization uses the
//! standard max-trick so large values cannot overflow `exp`, with a uniform
//! fallback if the denominator still degenerates.

use rand::rngs::StdRng;
use rand::Rng;

use crate::arm::{ArmRegistry, ArmState};
use crate::error::BanditError;
use crate::strategy::{sample_index, SelectionStrategy};

/// Softmax policy with a fixed temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Softmax {
    temperature: f64,
}

impl Softmax {
    /// Create with `temperature > 0` (finite).
    pub fn new(temperature: f64) -> Result<Self, BanditError> {
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(BanditError::ParameterOutOfRange {
                name: "temperature",
                value: temperature,
                constraint: "temperature > 0",
            });
        }
        Ok(Self { temperature })
    }

    /// The configured temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Selection probabilities in registry order (sums to 1).
    ///
    /// Exposed for traffic-splitting harnesses that want a distribution
    /// rather than an argmax choice.
    pub fn probabilities(&self, registry: &ArmRegistry) -> Result<Vec<(String, f64)>, BanditError> {
        if registry.is_empty() {
            return Err(BanditError::EmptyRegistry);
        }
        let max_value = registry
            .iter()
            .map(ArmState::value)
            .fold(f64::NEG_INFINITY, f64::max);
        let mut weights: Vec<f64> = registry
            .iter()
            .map(|a| ((a.value() - max_value) / self.temperature).exp())
            .collect();
        let denom: f64 = weights.iter().sum();
        if denom <= 0.0 || !denom.is_finite() {
            // Degenerate fallback: uniform.
            let k = weights.len() as f64;
            weights.iter_mut().for_each(|w| *w = 1.0 / k);
        } else {
            weights.iter_mut().for_each(|w| *w /= denom);
        }
        Ok(registry
            .names()
            .iter()
            .cloned()
            .zip(weights)
            .collect())
    }
}

impl SelectionStrategy for Softmax {
    fn select(&self, registry: &ArmRegistry, rng: &mut StdRng) -> Result<String, BanditError> {
        let probs = self.probabilities(registry)?;
        let weights: Vec<f64> = probs.iter().map(|(_, p)| *p).collect();
        let i = sample_index(&weights, rng.random::<f64>());
        Ok(probs[i].0.clone())
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
