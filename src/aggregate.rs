//! Reductions over batches of replica result sequences.
//!
//! A "replica" is one independent run's results, truncated to some horizon.
//! These are pure reductions for convergence/regret curves and scalar
//! comparisons; they never touch driver state. Replicas shorter than the
//! requested horizon contribute to the steps they actually reached.

use std::collections::BTreeMap;

use crate::driver::{Pulled, SimulationResult};

/// Per-step mean cumulative reward across replicas, truncated to `horizon`.
///
/// Entry `t - 1` is the mean of `cumulative_reward` at step `t` over all
/// replicas that reached that step. The vector is as long as the deepest
/// replica, capped at `horizon`.
pub fn mean_cumulative_by_step(replicas: &[Vec<SimulationResult>], horizon: usize) -> Vec<f64> {
    mean_by_step(replicas, horizon, |r| r.cumulative_reward)
}

/// Per-step mean instantaneous reward across replicas, truncated to `horizon`.
pub fn mean_reward_by_step(replicas: &[Vec<SimulationResult>], horizon: usize) -> Vec<f64> {
    mean_by_step(replicas, horizon, |r| r.reward)
}

fn mean_by_step<F>(replicas: &[Vec<SimulationResult>], horizon: usize, field: F) -> Vec<f64>
where
    F: Fn(&SimulationResult) -> f64,
{
    let depth = replicas
        .iter()
        .map(|r| r.len().min(horizon))
        .max()
        .unwrap_or(0);
    let mut sums = vec![0.0f64; depth];
    let mut counts = vec![0u64; depth];
    for replica in replicas {
        for (i, result) in replica.iter().take(horizon).enumerate() {
            sums[i] += field(result);
            counts[i] += 1;
        }
    }
    sums.iter()
        .zip(&counts)
        .map(|(s, &n)| if n == 0 { 0.0 } else { s / n as f64 })
        .collect()
}

/// Each replica's terminal cumulative reward (0.0 for an empty replica).
pub fn terminal_cumulative(replicas: &[Vec<SimulationResult>]) -> Vec<f64> {
    replicas
        .iter()
        .map(|r| r.last().map(|x| x.cumulative_reward).unwrap_or(0.0))
        .collect()
}

/// Per-arm pull tallies over one replica's results.
///
/// Chained results count one pull per stage arm.
pub fn pull_counts(results: &[SimulationResult]) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for r in results {
        match &r.pulled {
            Pulled::Single(a) => *counts.entry(a.clone()).or_default() += 1,
            Pulled::Pair(a, b) => {
                *counts.entry(a.clone()).or_default() += 1;
                *counts.entry(b.clone()).or_default() += 1;
            }
        }
    }
    counts
}
