//! Per-run simulation settings.

use serde::{Deserialize, Serialize};

/// Default tick watchdog.
pub const DEFAULT_MAX_TICKS: u32 = 100_000;

/// Settings for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for component error draws.
    pub seed: u64,
    /// Send tasks back for additional work when a target component exceeds
    /// its error tolerance.
    pub consider_rework: bool,
    /// Abort once this many ticks have run (`None` = unbounded).
    pub max_ticks: Option<u32>,
    /// Abort when no task is working and none can start.
    pub detect_stall: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            consider_rework: false,
            max_ticks: Some(DEFAULT_MAX_TICKS),
            detect_stall: true,
        }
    }
}

impl SimulationConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_rework(mut self, consider_rework: bool) -> Self {
        self.consider_rework = consider_rework;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<u32>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn with_stall_detection(mut self, detect_stall: bool) -> Self {
        self.detect_stall = detect_stall;
        self
    }
}
