//! The Monte Carlo stepping protocol.
//!
//! One step is a pure function of `(registry, previous result)` plus an
//! explicit randomness stream:
//!
//! 1. the strategy selects an arm,
//! 2. the environment samples a reward for it,
//! 3. the strategy folds the reward into a pulled copy of the arm,
//! 4. the updated arm is merged into a **new** registry snapshot,
//! 5. a [`SimulationResult`] is emitted with `t` and `cumulative_reward`
//!    carried forward from the previous result.
//!
//! Nothing is mutated in place, so snapshots can be replayed and independent
//! replicas run concurrently without locking. The step sequence is exposed
//! lazily through [`Simulation`] (unbounded; the consumer truncates it) and
//! bounded through [`run`]. [`ChainedSimulation`] steps two independent
//! stages per tick and updates both with one combined reward — the
//! "conversion requires success at every stage" model.
//!
//! Errors surface synchronously and are never retried or swallowed: a
//! malformed configuration fails the run immediately rather than silently
//! biasing results.

use rand::rngs::StdRng;
use tracing::debug;

use crate::arm::ArmRegistry;
use crate::environment::RewardModel;
use crate::error::BanditError;
use crate::strategy::SelectionStrategy;

/// Which arm(s) a step pulled.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pulled {
    /// Single-stage bandit: one arm.
    Single(String),
    /// Chained bandit: one arm per stage, in stage order.
    Pair(String, String),
}

impl std::fmt::Display for Pulled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pulled::Single(a) => write!(f, "{a}"),
            Pulled::Pair(a, b) => write!(f, "{a}+{b}"),
        }
    }
}

/// The immutable record of one simulation step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationResult {
    /// Arm(s) pulled this step.
    pub pulled: Pulled,
    /// Reward observed this step.
    pub reward: f64,
    /// Step index, starting at 1.
    pub t: u64,
    /// Running sum of rewards through step `t`.
    pub cumulative_reward: f64,
}

/// A `(registry, last result)` snapshot pair — everything one step needs to
/// produce the next.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimState {
    registry: ArmRegistry,
    last: Option<SimulationResult>,
}

impl SimState {
    /// Start a run from a fresh registry (no steps taken yet).
    pub fn new(registry: ArmRegistry) -> Self {
        Self {
            registry,
            last: None,
        }
    }

    /// The current registry snapshot.
    pub fn registry(&self) -> &ArmRegistry {
        &self.registry
    }

    /// The most recent step result, if any step has been taken.
    pub fn last(&self) -> Option<&SimulationResult> {
        self.last.as_ref()
    }
}

/// Create a registry for a fresh run: all supplied arms at zero pulls.
pub fn initialize<I, S>(arm_names: I) -> Result<ArmRegistry, BanditError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ArmRegistry::new(arm_names)
}

/// Advance one step, returning the next snapshot (which carries the emitted
/// [`SimulationResult`]).
pub fn step<E, S>(
    env: &E,
    strategy: &S,
    state: &SimState,
    rng: &mut StdRng,
) -> Result<SimState, BanditError>
where
    E: RewardModel,
    S: SelectionStrategy,
{
    let registry = &state.registry;
    let chosen = strategy.select(registry, rng)?;
    let reward = env.sample(&chosen, rng)?;

    let pulled_arm = registry
        .get(&chosen)
        .ok_or_else(|| BanditError::UnknownArm(chosen.clone()))?
        .pull();
    let updated = strategy.update(pulled_arm, reward, registry)?;
    let next_registry = registry.merge(updated)?;

    let (t, cumulative) = match &state.last {
        Some(prev) => (prev.t + 1, prev.cumulative_reward + reward),
        None => (1, reward),
    };
    Ok(SimState {
        registry: next_registry,
        last: Some(SimulationResult {
            pulled: Pulled::Single(chosen),
            reward,
            t,
            cumulative_reward: cumulative,
        }),
    })
}

/// Lazy, unbounded step sequence for a single-stage bandit.
///
/// Yields `Result<SimulationResult, BanditError>` and fuses after the first
/// error. Owns its registry snapshot and RNG, so a run is restartable by
/// reconstructing the simulation with the same seed (not rewindable).
pub struct Simulation<'a, E, S> {
    env: &'a E,
    strategy: &'a S,
    state: SimState,
    rng: StdRng,
    poisoned: bool,
}

impl<'a, E, S> Simulation<'a, E, S>
where
    E: RewardModel,
    S: SelectionStrategy,
{
    pub fn new(env: &'a E, strategy: &'a S, registry: ArmRegistry, rng: StdRng) -> Self {
        Self {
            env,
            strategy,
            state: SimState::new(registry),
            rng,
            poisoned: false,
        }
    }

    /// The current snapshot (registry + last result).
    pub fn state(&self) -> &SimState {
        &self.state
    }
}

impl<E, S> Iterator for Simulation<'_, E, S>
where
    E: RewardModel,
    S: SelectionStrategy,
{
    type Item = Result<SimulationResult, BanditError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }
        match step(self.env, self.strategy, &self.state, &mut self.rng) {
            Ok(next) => {
                self.state = next;
                // `step` always sets `last` on success.
                self.state.last.clone().map(Ok)
            }
            Err(e) => {
                self.poisoned = true;
                Some(Err(e))
            }
        }
    }
}

/// Bounded consumption of the lazy step sequence: `horizon` steps or the
/// first error.
pub fn run<E, S>(
    env: &E,
    strategy: &S,
    registry: ArmRegistry,
    horizon: usize,
    rng: StdRng,
) -> Result<Vec<SimulationResult>, BanditError>
where
    E: RewardModel,
    S: SelectionStrategy,
{
    debug!(arms = registry.len(), horizon, "starting run");
    Simulation::new(env, strategy, registry, rng)
        .take(horizon)
        .collect()
}

/// One stage of a chained bandit: its own environment, strategy, and
/// registry snapshot.
pub struct Stage<'a, E, S> {
    env: &'a E,
    strategy: &'a S,
    registry: ArmRegistry,
}

impl<'a, E, S> Stage<'a, E, S>
where
    E: RewardModel,
    S: SelectionStrategy,
{
    pub fn new(env: &'a E, strategy: &'a S, registry: ArmRegistry) -> Self {
        Self {
            env,
            strategy,
            registry,
        }
    }

    /// The stage's current registry snapshot.
    pub fn registry(&self) -> &ArmRegistry {
        &self.registry
    }
}

/// Combine stage rewards as "every stage must pay off": the product, which
/// for Bernoulli stages is logical AND.
pub fn both_stages(first: f64, second: f64) -> f64 {
    first * second
}

/// Lazy, unbounded step sequence for a two-stage chained bandit.
///
/// Per tick both stages select and sample independently, the combined reward
/// is computed from the two stage outcomes, and **both** registries are
/// updated with that single shared reward. Fuses after the first error.
pub struct ChainedSimulation<'a, E1, S1, E2, S2, C> {
    first: Stage<'a, E1, S1>,
    second: Stage<'a, E2, S2>,
    combine: C,
    last: Option<SimulationResult>,
    rng: StdRng,
    poisoned: bool,
}

impl<'a, E1, S1, E2, S2, C> ChainedSimulation<'a, E1, S1, E2, S2, C>
where
    E1: RewardModel,
    S1: SelectionStrategy,
    E2: RewardModel,
    S2: SelectionStrategy,
    C: Fn(f64, f64) -> f64,
{
    pub fn new(first: Stage<'a, E1, S1>, second: Stage<'a, E2, S2>, combine: C, rng: StdRng) -> Self {
        Self {
            first,
            second,
            combine,
            last: None,
            rng,
            poisoned: false,
        }
    }

    /// Registry snapshots for both stages.
    pub fn registries(&self) -> (&ArmRegistry, &ArmRegistry) {
        (&self.first.registry, &self.second.registry)
    }

    fn tick(&mut self) -> Result<SimulationResult, BanditError> {
        let arm1 = self.first.strategy.select(&self.first.registry, &mut self.rng)?;
        let arm2 = self
            .second
            .strategy
            .select(&self.second.registry, &mut self.rng)?;
        let r1 = self.first.env.sample(&arm1, &mut self.rng)?;
        let r2 = self.second.env.sample(&arm2, &mut self.rng)?;
        let reward = (self.combine)(r1, r2);

        let pulled1 = self
            .first
            .registry
            .get(&arm1)
            .ok_or_else(|| BanditError::UnknownArm(arm1.clone()))?
            .pull();
        let updated1 = self.first.strategy.update(pulled1, reward, &self.first.registry)?;
        self.first.registry = self.first.registry.merge(updated1)?;

        let pulled2 = self
            .second
            .registry
            .get(&arm2)
            .ok_or_else(|| BanditError::UnknownArm(arm2.clone()))?
            .pull();
        let updated2 = self
            .second
            .strategy
            .update(pulled2, reward, &self.second.registry)?;
        self.second.registry = self.second.registry.merge(updated2)?;

        let (t, cumulative) = match &self.last {
            Some(prev) => (prev.t + 1, prev.cumulative_reward + reward),
            None => (1, reward),
        };
        Ok(SimulationResult {
            pulled: Pulled::Pair(arm1, arm2),
            reward,
            t,
            cumulative_reward: cumulative,
        })
    }
}

impl<E1, S1, E2, S2, C> Iterator for ChainedSimulation<'_, E1, S1, E2, S2, C>
where
    E1: RewardModel,
    S1: SelectionStrategy,
    E2: RewardModel,
    S2: SelectionStrategy,
    C: Fn(f64, f64) -> f64,
{
    type Item = Result<SimulationResult, BanditError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }
        match self.tick() {
            Ok(result) => {
                self.last = Some(result.clone());
                Some(Ok(result))
            }
            Err(e) => {
                self.poisoned = true;
                Some(Err(e))
            }
        }
    }
}

/// Bounded consumption of a chained simulation.
pub fn run_chained<E1, S1, E2, S2, C>(
    first: Stage<'_, E1, S1>,
    second: Stage<'_, E2, S2>,
    combine: C,
    horizon: usize,
    rng: StdRng,
) -> Result<Vec<SimulationResult>, BanditError>
where
    E1: RewardModel,
    S1: SelectionStrategy,
    E2: RewardModel,
    S2: SelectionStrategy,
    C: Fn(f64, f64) -> f64,
{
    debug!(
        first_arms = first.registry.len(),
        second_arms = second.registry.len(),
        horizon,
        "starting chained run"
    );
    ChainedSimulation::new(first, second, combine, rng)
        .take(horizon)
        .collect()
}
