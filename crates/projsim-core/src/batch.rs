//! Replicate runs for statistical sampling.
//!
//! Each seed gets its own clone of the project and its own simulator, so the
//! runs share nothing and execute on the rayon thread pool.

use crate::config::SimulationConfig;
use crate::engine::Simulator;
use crate::error::SimulationError;
use crate::model::ProjectModel;
use crate::results::SimulationSummary;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of one replicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicateResult {
    pub seed: u64,
    pub summary: SimulationSummary,
}

/// Min / mean / max of one summary scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl Stat {
    fn from_values(values: impl Iterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        (count > 0).then(|| Stat {
            min,
            mean: sum / count as f64,
            max,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub runs: usize,
    pub total_cost: Stat,
    pub duration: Stat,
    pub total_work_amount: Stat,
}

impl BatchStatistics {
    /// `None` when `results` is empty.
    pub fn from_results(results: &[ReplicateResult]) -> Option<Self> {
        Some(Self {
            runs: results.len(),
            total_cost: Stat::from_values(results.iter().map(|r| r.summary.total_cost))?,
            duration: Stat::from_values(results.iter().map(|r| r.summary.duration as f64))?,
            total_work_amount: Stat::from_values(
                results.iter().map(|r| r.summary.total_work_amount),
            )?,
        })
    }
}

/// Run `project` once per seed in parallel. Results come back in seed order;
/// any failing replicate fails the whole batch.
pub fn run_batch(
    project: &ProjectModel,
    config: &SimulationConfig,
    seeds: &[u64],
) -> Result<Vec<ReplicateResult>, SimulationError> {
    info!("running {} replicates", seeds.len());
    seeds
        .par_iter()
        .map(|&seed| {
            let mut sim = Simulator::new(project.clone(), config.clone().with_seed(seed));
            let summary = sim.execute()?;
            Ok(ReplicateResult { seed, summary })
        })
        .collect()
}

/// `count` consecutive seeds starting at `base`.
pub fn seed_range(base: u64, count: usize) -> Vec<u64> {
    (0..count as u64).map(|i| base.wrapping_add(i)).collect()
}
