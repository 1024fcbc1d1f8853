//! Bayesian Thompson sampling over Beta posteriors (Thompson 1933; Chapelle
//! & Li 2011).
//!
//! Each arm carries a `Beta(alpha, beta)` posterior over its Bernoulli
//! success rate. Selection first pulls each unpulled arm once in registry
//! order, then draws one posterior sample per arm and takes the largest.
//! Updates are the conjugate increment, which is only meaningful for binary
//! rewards — anything outside `{0, 1}` is rejected as a domain error rather
//! than silently corrupting the posterior.

use rand::rngs::StdRng;
use rand_distr::{Beta, Distribution};

use crate::arm::{ArmRegistry, ArmState};
use crate::error::BanditError;
use crate::strategy::SelectionStrategy;
use crate::TIEBREAK_EPS;

/// Thompson sampling with a shared `Beta(alpha0, beta0)` prior.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BayesThompson {
    alpha0: f64,
    beta0: f64,
}

impl Default for BayesThompson {
    /// The uniform `Beta(1, 1)` prior.
    fn default() -> Self {
        Self {
            alpha0: 1.0,
            beta0: 1.0,
        }
    }
}

impl BayesThompson {
    /// Uniform-prior Thompson sampling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with an explicit prior; both parameters must be finite and
    /// positive.
    pub fn with_prior(alpha0: f64, beta0: f64) -> Result<Self, BanditError> {
        if !alpha0.is_finite() || alpha0 <= 0.0 {
            return Err(BanditError::ParameterOutOfRange {
                name: "alpha0",
                value: alpha0,
                constraint: "alpha0 > 0",
            });
        }
        if !beta0.is_finite() || beta0 <= 0.0 {
            return Err(BanditError::ParameterOutOfRange {
                name: "beta0",
                value: beta0,
                constraint: "beta0 > 0",
            });
        }
        Ok(Self { alpha0, beta0 })
    }

    /// The prior parameters `(alpha0, beta0)`.
    pub fn prior(&self) -> (f64, f64) {
        (self.alpha0, self.beta0)
    }

    /// Seed a fresh registry's arms with this strategy's prior.
    ///
    /// Arms default to `Beta(1, 1)`; with a non-uniform prior, apply it
    /// before the first step so every arm starts from the same belief.
    pub fn seed_registry(&self, registry: &ArmRegistry) -> Result<ArmRegistry, BanditError> {
        let mut out = registry.clone();
        for name in registry.names().to_vec() {
            let arm = out
                .get(&name)
                .ok_or_else(|| BanditError::UnknownArm(name.clone()))?
                .with_prior(self.alpha0, self.beta0);
            out = out.merge(arm)?;
        }
        Ok(out)
    }

    fn draw(arm: &ArmState, rng: &mut StdRng) -> Result<f64, BanditError> {
        let (alpha, beta) = (arm.alpha(), arm.beta());
        let dist = Beta::new(alpha, beta)
            .map_err(|_| BanditError::InvalidPosterior { alpha, beta })?;
        Ok(dist.sample(rng))
    }
}

impl SelectionStrategy for BayesThompson {
    fn select(&self, registry: &ArmRegistry, rng: &mut StdRng) -> Result<String, BanditError> {
        if registry.is_empty() {
            return Err(BanditError::EmptyRegistry);
        }
        // Cold start: give every arm one observation before trusting the
        // posteriors, walking the registry in order.
        if let Some(arm) = registry.unpulled().next() {
            return Ok(arm.name().to_string());
        }
        let mut best: Option<(&ArmState, f64)> = None;
        for arm in registry.iter() {
            let x = Self::draw(arm, rng)?;
            match best {
                Some((_, bx)) if x <= bx + TIEBREAK_EPS => {}
                _ => best = Some((arm, x)),
            }
        }
        best.map(|(a, _)| a.name().to_string())
            .ok_or(BanditError::EmptyRegistry)
    }

    fn update(
        &self,
        arm: ArmState,
        reward: f64,
        _registry: &ArmRegistry,
    ) -> Result<ArmState, BanditError> {
        if reward != 0.0 && reward != 1.0 {
            return Err(BanditError::NonBinaryReward(reward));
        }
        let alpha = arm.alpha() + reward;
        let beta = arm.beta() + (1.0 - reward);
        Ok(arm.apply_reward(reward).with_posterior(alpha, beta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn prior_must_be_positive_and_finite() {
        assert!(BayesThompson::with_prior(0.0, 1.0).is_err());
        assert!(BayesThompson::with_prior(1.0, -2.0).is_err());
        assert!(BayesThompson::with_prior(f64::NAN, 1.0).is_err());
        assert!(BayesThompson::with_prior(2.5, 7.5).is_ok());
    }

    #[test]
    fn update_rejects_non_binary_rewards() {
        let strat = BayesThompson::new();
        let reg = ArmRegistry::new(["a"]).unwrap();
        let arm = reg.get("a").unwrap().pull();

        let err = strat.update(arm.clone(), 0.5, &reg).unwrap_err();
        assert_eq!(err, BanditError::NonBinaryReward(0.5));
        assert!(strat.update(arm.clone(), 0.0, &reg).is_ok());
        assert!(strat.update(arm, 1.0, &reg).is_ok());
    }

    #[test]
    fn conjugate_update_increments_the_right_parameter() {
        let strat = BayesThompson::new();
        let reg = ArmRegistry::new(["a"]).unwrap();

        let win = strat
            .update(reg.get("a").unwrap().pull(), 1.0, &reg)
            .unwrap();
        assert_eq!((win.alpha(), win.beta()), (2.0, 1.0));
        assert_eq!(win.value(), 1.0);

        let lose = strat.update(win.pull(), 0.0, &reg).unwrap();
        assert_eq!((lose.alpha(), lose.beta()), (2.0, 2.0));
        assert_eq!(lose.value(), 0.5);
    }

    #[test]
    fn seed_registry_applies_the_prior_to_every_arm() {
        let strat = BayesThompson::with_prior(3.0, 2.0).unwrap();
        let reg = strat
            .seed_registry(&ArmRegistry::new(["a", "b"]).unwrap())
            .unwrap();
        for arm in reg.iter() {
            assert_eq!((arm.alpha(), arm.beta()), (3.0, 2.0));
        }
    }

    #[test]
    fn posterior_concentration_drives_selection() {
        let strat = BayesThompson::new();
        let mut reg = ArmRegistry::new(["good", "bad"]).unwrap();
        // Strongly separated posteriors on already-pulled arms.
        reg = reg
            .merge(reg.get("good").unwrap().pull().with_prior(80.0, 20.0))
            .unwrap();
        reg = reg
            .merge(reg.get("bad").unwrap().pull().with_prior(20.0, 80.0))
            .unwrap();

        let mut rng = StdRng::seed_from_u64(5);
        let mut good = 0u32;
        for _ in 0..200 {
            if strat.select(&reg, &mut rng).unwrap() == "good" {
                good += 1;
            }
        }
        assert!(good > 190, "good={good}");
    }

    #[test]
    fn cold_start_pulls_each_arm_once_in_order() {
        let strat = BayesThompson::new();
        let mut reg = ArmRegistry::new(["a", "b"]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        // A fresh registry must not revisit an arm before every arm has
        // one observation, whatever the posterior draws say.
        let first = strat.select(&reg, &mut rng).unwrap();
        assert_eq!(first, "a");
        reg = reg.merge(reg.get("a").unwrap().pull()).unwrap();

        let second = strat.select(&reg, &mut rng).unwrap();
        assert_eq!(second, "b");
    }

    #[test]
    fn selection_is_seed_deterministic() {
        let strat = BayesThompson::new();
        let mut reg = ArmRegistry::new(["a", "b", "c"]).unwrap();
        for name in ["a", "b", "c"] {
            reg = reg.merge(reg.get(name).unwrap().pull()).unwrap();
        }
        let mut r1 = StdRng::seed_from_u64(21);
        let mut r2 = StdRng::seed_from_u64(21);
        for _ in 0..30 {
            assert_eq!(
                strat.select(&reg, &mut r1).unwrap(),
                strat.select(&reg, &mut r2).unwrap()
            );
        }
    }

    #[test]
    fn empty_registry_errors() {
        let strat = BayesThompson::new();
        let reg = ArmRegistry::new(Vec::<String>::new()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            strat.select(&reg, &mut rng).unwrap_err(),
            BanditError::EmptyRegistry
        );
    }
}
