//! Per-arm statistics and the ordered arm collection.
//!
//! [`ArmState`] is a small immutable-by-convention snapshot: operations on it
//! (`pull`, `apply_reward`) return updated copies rather than mutating in
//! place. [`ArmRegistry`] holds one state per arm in a **fixed iteration
//! order** (the order of the caller-supplied name list at creation). Several
//! policies depend on that stability — UCB1 and Thompson cold-start walk the
//! registry in order, and deterministic argmax tie-breaks award the first arm
//! encountered — so the order is a documented contract, not an incidental
//! property of the backing map.

use std::collections::BTreeMap;

use crate::error::BanditError;

/// Statistics for one selectable arm.
///
/// `value` is the exact unweighted running mean of observed rewards; it is
/// meaningful only once `pulls > 0` (the first reward seeds it). The EXP3
/// weight is consulted only by EXP3 and kept in the log domain so long
/// favorable runs cannot overflow it; `alpha`/`beta` only matter to Thompson
/// sampling. The unused fields sit at their defaults for every other policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmState {
    name: String,
    pulls: u64,
    value: f64,
    log_weight: f64,
    alpha: f64,
    beta: f64,
}

impl ArmState {
    /// A fresh arm: no pulls, unit EXP3 weight, uniform Beta(1, 1) prior.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pulls: 0,
            value: 0.0,
            log_weight: 0.0,
            alpha: 1.0,
            beta: 1.0,
        }
    }

    /// Arm identifier (unique within a registry).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of selection-and-observation events recorded for this arm.
    pub fn pulls(&self) -> u64 {
        self.pulls
    }

    /// Running mean reward estimate (meaningful once `pulls > 0`).
    pub fn value(&self) -> f64 {
        self.value
    }

    /// EXP3 weight, i.e. `exp(log_weight)` (1.0 until EXP3 updates it).
    ///
    /// Reporting only: EXP3 itself works on [`log_weight`](Self::log_weight),
    /// which stays finite on long favorable runs even when this saturates.
    pub fn weight(&self) -> f64 {
        self.log_weight.exp()
    }

    /// Log-domain EXP3 weight (0.0 until EXP3 updates it).
    pub fn log_weight(&self) -> f64 {
        self.log_weight
    }

    /// Beta posterior alpha (Thompson sampling).
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Beta posterior beta (Thompson sampling).
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Pure copy with `pulls` incremented by one.
    #[must_use]
    pub fn pull(&self) -> Self {
        Self {
            pulls: self.pulls + 1,
            ..self.clone()
        }
    }

    /// Fold a reward into the running mean.
    ///
    /// Assumes the pull for this observation has already been counted (the
    /// driver calls [`pull`](Self::pull) first), so the post-increment count
    /// is the divisor. The first pull seeds `value = reward` outright rather
    /// than dividing by `pulls - 1 == 0`.
    #[must_use]
    pub fn apply_reward(&self, reward: f64) -> Self {
        let n = self.pulls.max(1) as f64;
        let value = if self.pulls <= 1 {
            reward
        } else {
            self.value * (n - 1.0) / n + reward / n
        };
        Self {
            value,
            ..self.clone()
        }
    }

    /// Copy with a replaced log-domain EXP3 weight.
    #[must_use]
    pub(crate) fn with_log_weight(&self, log_weight: f64) -> Self {
        Self {
            log_weight,
            ..self.clone()
        }
    }

    /// Copy with a replaced Beta posterior.
    #[must_use]
    pub(crate) fn with_posterior(&self, alpha: f64, beta: f64) -> Self {
        Self {
            alpha,
            beta,
            ..self.clone()
        }
    }

    /// Copy with an explicit prior (used when a registry is seeded for
    /// Thompson sampling with non-uniform priors).
    #[must_use]
    pub fn with_prior(&self, alpha: f64, beta: f64) -> Self {
        self.with_posterior(alpha, beta)
    }
}

/// An ordered association of arm name to [`ArmState`].
///
/// Never mutated in place: [`merge`](Self::merge) returns a new registry with
/// one entry replaced, so snapshots can be replayed and independent replicas
/// share nothing mutable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmRegistry {
    order: Vec<String>,
    arms: BTreeMap<String, ArmState>,
}

impl ArmRegistry {
    /// Build a registry from arm names, all starting at zero pulls.
    ///
    /// Iteration order is the order of `names`. Duplicate names are a
    /// configuration error.
    pub fn new<I, S>(names: I) -> Result<Self, BanditError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order: Vec<String> = Vec::new();
        let mut arms: BTreeMap<String, ArmState> = BTreeMap::new();
        for name in names {
            let name = name.into();
            if arms.contains_key(&name) {
                return Err(BanditError::DuplicateArm(name));
            }
            order.push(name.clone());
            arms.insert(name.clone(), ArmState::new(name));
        }
        Ok(Self { order, arms })
    }

    /// Number of arms.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry has no arms.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Arm names in registry order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Look up one arm's state.
    pub fn get(&self, name: &str) -> Option<&ArmState> {
        self.arms.get(name)
    }

    /// Iterate arm states in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &ArmState> + '_ {
        self.order.iter().map(|n| &self.arms[n])
    }

    /// New registry with `updated` replacing its existing entry.
    ///
    /// Fails with a configuration error if the arm name is not already
    /// present; `merge` never grows or reorders the registry.
    pub fn merge(&self, updated: ArmState) -> Result<Self, BanditError> {
        if !self.arms.contains_key(updated.name()) {
            return Err(BanditError::UnknownArm(updated.name().to_string()));
        }
        let mut next = self.clone();
        next.arms.insert(updated.name().to_string(), updated);
        Ok(next)
    }

    /// Sum of all arm pull counts — the global step counter of a run.
    pub fn total_pulls(&self) -> u64 {
        self.iter().map(ArmState::pulls).sum()
    }

    /// Arms not yet pulled, in registry order (cold-start support).
    pub fn unpulled(&self) -> impl Iterator<Item = &ArmState> + '_ {
        self.iter().filter(|a| a.pulls() == 0)
    }
}
