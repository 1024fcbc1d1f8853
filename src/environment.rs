//! Reward environments: arm id → stochastic reward.
//!
//! The core consumes rewards through a single-method capability so harnesses
//! can plug in anything from a lookup table of Bernoulli rates to an ad-hoc
//! closure. Randomness is passed in, never ambient, so environments are
//! reproducible under a fixed seed.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::BanditError;

/// A stochastic reward source keyed by arm identifier.
///
/// Sampling an arm the environment does not know is a configuration error:
/// it means the registry and the environment disagree about the arm set, and
/// the run must fail rather than silently bias results.
pub trait RewardModel {
    /// Draw one reward for `arm`.
    fn sample(&self, arm: &str, rng: &mut StdRng) -> Result<f64, BanditError>;
}

/// Any `Fn(&str, &mut StdRng) -> Result<f64, BanditError>` is a reward model.
impl<F> RewardModel for F
where
    F: Fn(&str, &mut StdRng) -> Result<f64, BanditError>,
{
    fn sample(&self, arm: &str, rng: &mut StdRng) -> Result<f64, BanditError> {
        self(arm, rng)
    }
}

/// Bernoulli rewards: arm → success probability, reward ∈ {0.0, 1.0}.
///
/// The common environment for A/B-style conversion simulations, and the only
/// reward shape Thompson sampling accepts.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BernoulliModel {
    rates: BTreeMap<String, f64>,
}

impl BernoulliModel {
    /// Build from `(arm, success_rate)` pairs. Rates must lie in `[0, 1]`.
    pub fn new<I, S>(rates: I) -> Result<Self, BanditError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut out = BTreeMap::new();
        for (arm, p) in rates {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(BanditError::ParameterOutOfRange {
                    name: "success_rate",
                    value: p,
                    constraint: "0 <= p <= 1",
                });
            }
            out.insert(arm.into(), p);
        }
        Ok(Self { rates: out })
    }

    /// The configured success rate for `arm`, if known.
    pub fn rate(&self, arm: &str) -> Option<f64> {
        self.rates.get(arm).copied()
    }
}

impl RewardModel for BernoulliModel {
    fn sample(&self, arm: &str, rng: &mut StdRng) -> Result<f64, BanditError> {
        let p = self
            .rates
            .get(arm)
            .copied()
            .ok_or_else(|| BanditError::UnknownArm(arm.to_string()))?;
        Ok(if rng.random::<f64>() < p { 1.0 } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn bernoulli_rejects_out_of_range_rates() {
        let err = BernoulliModel::new([("a", 1.5)]).unwrap_err();
        assert!(matches!(err, BanditError::ParameterOutOfRange { .. }));
        assert!(BernoulliModel::new([("a", f64::NAN)]).is_err());
    }

    #[test]
    fn unknown_arm_is_a_configuration_error() {
        let env = BernoulliModel::new([("a", 0.5)]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let err = env.sample("b", &mut rng).unwrap_err();
        assert_eq!(err, BanditError::UnknownArm("b".to_string()));
    }

    #[test]
    fn degenerate_rates_are_deterministic() {
        let env = BernoulliModel::new([("win", 1.0), ("lose", 0.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(env.sample("win", &mut rng).unwrap(), 1.0);
            assert_eq!(env.sample("lose", &mut rng).unwrap(), 0.0);
        }
    }

    #[test]
    fn empirical_rate_tracks_configured_rate() {
        let env = BernoulliModel::new([("a", 0.3)]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let mut hits = 0u64;
        for _ in 0..n {
            hits += env.sample("a", &mut rng).unwrap() as u64;
        }
        let rate = hits as f64 / n as f64;
        assert!((rate - 0.3).abs() < 0.02, "rate={rate}");
    }

    #[test]
    fn closures_are_reward_models() {
        let env = |arm: &str, _rng: &mut StdRng| {
            if arm == "a" {
                Ok(0.25)
            } else {
                Err(BanditError::UnknownArm(arm.to_string()))
            }
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(env.sample("a", &mut rng).unwrap(), 0.25);
        assert!(env.sample("b", &mut rng).is_err());
    }
}
