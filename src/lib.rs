//! `banditsim`: multi-armed bandit policies and a Monte Carlo harness for
//! comparing them.
//!
//! Designed for "arm selection" problems simulated offline: you have a small
//! set of arms (page variants, ad creatives, treatment assignments — anything
//! you choose between repeatedly), a stochastic reward model per arm, and you
//! want to know how different sequential strategies trade exploring uncertain
//! options against exploiting the best-known one before betting real traffic
//! on any of them.
//!
//! **Goals:**
//! - **Reproducible by default**: every stochastic operation draws from an
//!   explicitly passed seeded RNG; same seed + same environment → identical
//!   result sequences.
//! - **Immutable stepping**: each step replaces one arm's statistics and
//!   yields a new [`ArmRegistry`] snapshot — no in-place mutation, so replays
//!   are exact and independent replicas share nothing mutable.
//! - **Small K**: designed for 2–10 arms per stage; not intended for K in
//!   the hundreds.
//!
//! **Selection policies** (all implement [`SelectionStrategy`]):
//! - [`EpsilonGreedy`]: uniform exploration with probability epsilon, greedy
//!   argmax otherwise.
//! - [`Softmax`]: Boltzmann exploration, probability ∝ `exp(value / T)`.
//! - [`Ucb1`]: deterministic optimism, `value + sqrt(2 ln(n) / n_i)` (Auer,
//!   Cesa-Bianchi & Fischer 2002).
//! - [`Exp3`]: exponential weights with an exploration floor, for
//!   adversarial/non-stationary rewards (Auer, Cesa-Bianchi, Freund &
//!   Schapire 2002).
//! - [`BayesThompson`]: Beta-posterior Thompson sampling for Bernoulli
//!   rewards (Thompson 1933; Chapelle & Li 2011).
//!
//! **Harness:**
//! - [`Simulation`] / [`run`]: a lazy, unbounded step sequence over one
//!   (environment, strategy, registry) triple; consumers truncate it.
//! - [`ChainedSimulation`] / [`run_chained`]: two independent stages stepped
//!   per tick with one shared combined reward ("conversion requires success
//!   at every stage").
//! - [`mean_cumulative_by_step`] / [`terminal_cumulative`]: replica-batch
//!   reductions for convergence curves and scalar comparisons.
//!
//! **Non-goals:**
//! - Not a serving platform: no storage, networking, dashboards, or shared
//!   mutable registries. Concurrency is "run independent replicas on
//!   independent seeds".
//!
//! # Example
//!
//! ```rust
//! use banditsim::{initialize, run, BernoulliModel, EpsilonGreedy};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let env = BernoulliModel::new([("a", 0.9), ("b", 0.1)]).unwrap();
//! let strategy = EpsilonGreedy::new(0.1).unwrap();
//! let registry = initialize(["a", "b"]).unwrap();
//!
//! let results = run(&env, &strategy, registry, 500, StdRng::seed_from_u64(7)).unwrap();
//! assert_eq!(results.len(), 500);
//! assert!(results.last().unwrap().cumulative_reward > 300.0);
//! ```

#![forbid(unsafe_code)]

/// Epsilon used for floating-point tie-breaking in selection scoring.
///
/// This avoids exact equality comparisons on f64 scores and provides a stable
/// threshold across all argmax paths (greedy, UCB, posterior max).
const TIEBREAK_EPS: f64 = 1e-12;

mod error;
pub use error::*;

mod arm;
pub use arm::*;

mod environment;
pub use environment::*;

mod strategy;
pub use strategy::SelectionStrategy;

mod epsilon_greedy;
pub use epsilon_greedy::*;

mod softmax;
pub use softmax::*;

mod ucb;
pub use ucb::*;

mod exp3;
pub use exp3::*;

mod thompson;
pub use thompson::*;

mod driver;
pub use driver::*;

mod aggregate;
pub use aggregate::*;

pub const BANDITSIM_VERSION: &str = env!("CARGO_PKG_VERSION");
