//! EXP3: exponential-weight exploration/exploitation for adversarial rewards
//! (Auer, Cesa-Bianchi, Freund & Schapire 2002).
//!
//! Arm `i` is drawn with `p_i = (1 - gamma) * w_i / sum(w) + gamma / K`, so
//! `gamma` floors every arm's probability at `gamma / K` — at `gamma = 1`
//! the policy is pure uniform exploration. The weight update uses the
//! importance-weighted estimator `reward / p_i` with the exponent normalized
//! by `K`:
//!
//! ```text
//! w_i *= exp(gamma * (reward / p_i) / K)
//! ```
//!
//! Several equivalent normalizations exist in the literature; this crate
//! commits to the `/ K` form above. Rewards are expected in `[0, 1]` for the
//! usual regret guarantees (larger values only sharpen the update).
//!
//! Weights live in the log domain on [`ArmState`]: the update adds the
//! exponent to `log_weight`, and `probabilities` subtracts the maximum
//! before exponentiating. Raw multiplicative weights grow roughly a factor
//! of `e` per rewarded pull and overflow to infinity within a few thousand
//! steps; the log form keeps every probability finite at any horizon.

use rand::rngs::StdRng;
use rand::Rng;

use crate::arm::{ArmRegistry, ArmState};
use crate::error::BanditError;
use crate::strategy::{sample_index, SelectionStrategy};

/// EXP3 policy with a fixed exploration floor `gamma`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exp3 {
    gamma: f64,
}

impl Exp3 {
    /// Create with `gamma` in `(0, 1]`.
    pub fn new(gamma: f64) -> Result<Self, BanditError> {
        if !gamma.is_finite() || gamma <= 0.0 || gamma > 1.0 {
            return Err(BanditError::ParameterOutOfRange {
                name: "gamma",
                value: gamma,
                constraint: "0 < gamma <= 1",
            });
        }
        Ok(Self { gamma })
    }

    /// The configured exploration floor.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Selection probabilities in registry order (sums to 1 for any finite
    /// log-weight vector).
    ///
    /// The probabilities are invariant under a common shift of the log
    /// weights, so the maximum is subtracted before exponentiating and the
    /// largest weight always exponentiates to exactly 1.0.
    pub fn probabilities(&self, registry: &ArmRegistry) -> Result<Vec<(String, f64)>, BanditError> {
        if registry.is_empty() {
            return Err(BanditError::EmptyRegistry);
        }
        let k = registry.len() as f64;
        let max = registry
            .iter()
            .map(ArmState::log_weight)
            .fold(f64::NEG_INFINITY, f64::max);
        let shifted: Vec<f64> = registry
            .iter()
            .map(|a| (a.log_weight() - max).exp())
            .collect();
        let total: f64 = shifted.iter().sum();
        let floor = self.gamma / k;
        Ok(registry
            .iter()
            .zip(shifted)
            .map(|(a, w)| {
                let p = (1.0 - self.gamma) * w / total + floor;
                (a.name().to_string(), p)
            })
            .collect())
    }

    fn probability_of(&self, registry: &ArmRegistry, arm: &str) -> Result<f64, BanditError> {
        self.probabilities(registry)?
            .into_iter()
            .find(|(name, _)| name == arm)
            .map(|(_, p)| p)
            .ok_or_else(|| BanditError::UnknownArm(arm.to_string()))
    }
}

impl SelectionStrategy for Exp3 {
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
        registry: &ArmRegistry,
    ) -> Result<ArmState, BanditError> {
        // The selection-time probability: `pull` does not touch weights, so
        // the pre-merge registry still reflects the distribution the arm was
        // drawn from.
        let p = self.probability_of(registry, arm.name())?;
        let k = registry.len() as f64;
        let estimator = reward / p;
        let log_weight = arm.log_weight() + self.gamma * estimator / k;
        Ok(arm.apply_reward(reward).with_log_weight(log_weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn rejects_out_of_range_gamma() {
        assert!(Exp3::new(0.0).is_err());
        assert!(Exp3::new(-0.2).is_err());
        assert!(Exp3::new(1.5).is_err());
        assert!(Exp3::new(f64::NAN).is_err());
        assert!(Exp3::new(1.0).is_ok());
        assert!(Exp3::new(0.07).is_ok());
    }

    #[test]
    fn probabilities_sum_to_one_for_positive_weights() {
        let strat = Exp3::new(0.3).unwrap();
        let mut reg = ArmRegistry::new(["a", "b", "c"]).unwrap();
        // Skew the weights.
        reg = reg
            .merge(reg.get("b").unwrap().with_log_weight(5.0_f64.ln()))
            .unwrap();
        reg = reg
            .merge(reg.get("c").unwrap().with_log_weight(0.25_f64.ln()))
            .unwrap();

        let probs = strat.probabilities(&reg).unwrap();
        let sum: f64 = probs.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum={sum}");
        // The gamma/K floor holds for every arm.
        for (_, p) in &probs {
            assert!(*p >= 0.3 / 3.0 - 1e-12);
        }
    }

    #[test]
    fn gamma_one_is_uniform_regardless_of_weights() {
        let strat = Exp3::new(1.0).unwrap();
        let mut reg = ArmRegistry::new(["a", "b"]).unwrap();
        reg = reg
            .merge(reg.get("a").unwrap().with_log_weight(100.0_f64.ln()))
            .unwrap();
        let probs = strat.probabilities(&reg).unwrap();
        for (_, p) in probs {
            assert!((p - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn update_raises_only_the_rewarded_arm_weight() {
        let strat = Exp3::new(0.5).unwrap();
        let reg = ArmRegistry::new(["a", "b"]).unwrap();

        let updated = strat
            .update(reg.get("a").unwrap().pull(), 1.0, &reg)
            .unwrap();
        assert!(updated.log_weight() > 0.0);
        assert_eq!(updated.value(), 1.0);

        // Exact exponent: p = (1-γ)/2 + γ/2 = 0.5, estimator = 2, K = 2.
        let expected = 0.5 * 2.0 / 2.0;
        assert!((updated.log_weight() - expected).abs() < 1e-12);
        assert!((updated.weight() - expected.exp()).abs() < 1e-12);

        // Zero reward leaves the weight unchanged.
        let zero = strat
            .update(reg.get("b").unwrap().pull(), 0.0, &reg)
            .unwrap();
        assert_eq!(zero.log_weight(), 0.0);
        assert_eq!(zero.weight(), 1.0);
    }

    #[test]
    fn long_winning_streak_keeps_probabilities_finite() {
        // Thousands of consecutive unit rewards push a raw multiplicative
        // weight past f64::MAX; the log-domain form must stay well defined.
        let strat = Exp3::new(0.5).unwrap();
        let mut reg = ArmRegistry::new(["a", "b"]).unwrap();

        for _ in 0..5_000 {
            let arm = strat.update(reg.get("a").unwrap().pull(), 1.0, &reg).unwrap();
            reg = reg.merge(arm).unwrap();
        }

        let probs = strat.probabilities(&reg).unwrap();
        let sum: f64 = probs.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum={sum}");
        for (name, p) in &probs {
            assert!(p.is_finite(), "p({name})={p}");
            assert!(*p >= 0.5 / 2.0 - 1e-12);
        }
        // The streaked arm holds the entire non-floor mass.
        assert!((probs[0].1 - 0.75).abs() < 1e-9);
        assert!((probs[1].1 - 0.25).abs() < 1e-9);
    }

    #[test]
    fn selection_is_seed_deterministic() {
        let strat = Exp3::new(0.2).unwrap();
        let reg = ArmRegistry::new(["a", "b", "c"]).unwrap();
        let mut r1 = StdRng::seed_from_u64(99);
        let mut r2 = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            assert_eq!(
                strat.select(&reg, &mut r1).unwrap(),
                strat.select(&reg, &mut r2).unwrap()
            );
        }
    }

    #[test]
    fn empty_registry_errors() {
        let strat = Exp3::new(0.2).unwrap();
        let reg = ArmRegistry::new(Vec::<String>::new()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            strat.select(&reg, &mut rng).unwrap_err(),
            BanditError::EmptyRegistry
        );
    }
}
