//! Simulation engine - owns the clock and runs the tick loop

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::model::{ProjectModel, TaskRef};
use crate::results::{SimulationReport, SimulationSummary};
use crate::systems::*;
use log::{info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Clock value the tick ran at.
    pub time: u32,
    pub allocations: Vec<Allocation>,
    pub started: Vec<TaskRef>,
    pub finished: Vec<TaskRef>,
    pub reworked: Vec<TaskRef>,
    /// Tasks that became ready, at the start or end of the tick.
    pub ready: Vec<TaskRef>,
    /// Tasks that performed work this tick.
    pub worked: usize,
}

/// Discrete-time simulator over one [`ProjectModel`].
///
/// Not shareable between threads mid-run; replicate runs each get their own
/// simulator (see [`crate::batch`]).
pub struct Simulator {
    project: ProjectModel,
    config: SimulationConfig,
    rng: StdRng,
    time: u32,
}

impl Simulator {
    pub fn new(project: ProjectModel, config: SimulationConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            project,
            config,
            rng,
            time: 0,
        }
    }

    /// Reset the project, the clock and the random stream.
    pub fn initialize(&mut self) {
        self.project.initialize();
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.time = 0;
    }

    /// Change the seed used by the next `initialize`.
    pub fn set_seed(&mut self, seed: u64) {
        self.config.seed = seed;
    }

    pub fn set_consider_rework(&mut self, consider_rework: bool) {
        self.config.consider_rework = consider_rework;
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn time(&self) -> u32 {
        self.time
    }

    pub fn project(&self) -> &ProjectModel {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut ProjectModel {
        &mut self.project
    }

    pub fn into_project(self) -> ProjectModel {
        self.project
    }

    pub fn is_finished(&self) -> bool {
        self.project.is_finished()
    }

    /// Advance one tick.
    ///
    /// Sub-phase order: ready check, allocation, then per instance start,
    /// perform, finish/rework check, ready check and PERT update. Starts and
    /// the leading ready check are stamped with the current time; finishes,
    /// rework and the trailing ready check with the end of the tick.
    pub fn step(&mut self) -> Result<TickReport, SimulationError> {
        let now = self.time;
        let end = now + 1;
        let rework = self.config.consider_rework;
        let mut report = TickReport {
            time: now,
            ..Default::default()
        };

        for (i, instance) in self.project.instances.iter_mut().enumerate() {
            let ready = check_ready(&mut instance.workflow, now);
            report.ready.extend(ready.into_iter().map(|t| TaskRef::new(i, t)));
        }

        report.allocations = allocate(&mut self.project);

        let ProjectModel {
            organization,
            instances,
            ..
        } = &mut self.project;
        for (i, instance) in instances.iter_mut().enumerate() {
            let started = check_start(&mut instance.workflow, organization, now);
            report.started.extend(started.into_iter().map(|t| TaskRef::new(i, t)));

            report.worked += perform(instance, organization, &mut self.rng).len();

            let outcome = check_finish(i, instance, organization, end, rework);
            report.finished.extend(outcome.finished.into_iter().map(|t| TaskRef::new(i, t)));
            report.reworked.extend(outcome.reworked.into_iter().map(|t| TaskRef::new(i, t)));

            let ready = check_ready(&mut instance.workflow, end);
            report.ready.extend(ready.into_iter().map(|t| TaskRef::new(i, t)));

            instance.workflow.update_pert(now);
        }

        trace!(
            "tick {}: {} allocated, {} started, {} working, {} finished, {} reworked",
            now,
            report.allocations.len(),
            report.started.len(),
            report.worked,
            report.finished.len(),
            report.reworked.len()
        );

        if self.config.detect_stall && report.worked == 0 && !self.project.is_finished() {
            let pending = self
                .project
                .instances
                .iter()
                .flat_map(|i| i.workflow.tasks.iter())
                .filter(|t| !t.is_finished())
                .count();
            warn!("simulation stalled at tick {} with {} unfinished tasks", now, pending);
            return Err(SimulationError::Stalled { time: now, pending });
        }

        self.time = end;
        Ok(report)
    }

    /// Initialize and run until every workflow instance has finished.
    pub fn execute(&mut self) -> Result<SimulationSummary, SimulationError> {
        // the project may have been edited through `project_mut`
        self.project.validate()?;
        self.initialize();
        info!(
            "simulation start: {} instances, {} tasks, {} resources, limit {}, seed {}, rework {}",
            self.project.instances.len(),
            self.project.task_count(),
            self.project.organization.resources.len(),
            self.project.concurrency_limit,
            self.config.seed,
            self.config.consider_rework
        );

        while !self.project.is_finished() {
            if let Some(limit) = self.config.max_ticks {
                if self.time >= limit {
                    warn!("simulation exceeded tick limit {}", limit);
                    return Err(SimulationError::TickLimitExceeded { limit });
                }
            }
            self.step()?;
        }

        let summary = self.summary();
        info!(
            "simulation finished: cost {:.2}, duration {}, work {:.2}",
            summary.total_cost, summary.duration, summary.total_work_amount
        );
        Ok(summary)
    }

    /// Summary scalars of the current state.
    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            total_cost: self.project.total_cost(),
            duration: self.project.duration(),
            total_work_amount: self.project.total_actual_work_amount(),
            ticks: self.time,
        }
    }

    /// Summary plus per-entity time series.
    pub fn report(&self) -> SimulationReport {
        SimulationReport::new(&self.project, self.summary())
    }
}

/// Run `project` once under `config`.
pub fn run(project: ProjectModel, config: SimulationConfig) -> Result<SimulationReport, SimulationError> {
    let mut sim = Simulator::new(project, config);
    sim.execute()?;
    Ok(sim.report())
}
