//! ProjSim Core - Discrete-Time Project Execution Simulator
//!
//! Simulates a project represented as a dependency graph of tasks, performed
//! by teams of workers and facilities with per-task skills, while quality
//! components accumulate errors that can send tasks back for rework.
//!
//! # Architecture
//!
//! - **Model**: plain data in owning arenas linked by index handles
//!   (tasks, components, resources, teams, workflow instances)
//! - **Systems**: per-tick logic (PERT, admission, allocation, progress)
//! - **Engine**: the clock and the fixed sub-phase order of a tick
//!
//! # Example
//!
//! ```rust
//! use projsim_core::prelude::*;
//!
//! let mut org = Organization::new();
//! let team = org.add_team("dev");
//! org.add_worker(team, "ann", 2.0, SkillTable::new()
//!     .with("design", Skill::with_work_rate(1.0))
//!     .with("code", Skill::with_work_rate(1.0)));
//!
//! let mut workflow = Workflow::new("release", 10.0);
//! let design = workflow.add_task("design", 2.0, team);
//! let code = workflow.add_task("code", 3.0, team);
//! workflow.add_dependency(design, code);
//!
//! let instance = WorkflowInstance::new(workflow, ComponentTree::new());
//! let project = ProjectModel::new(org, instance, 1, 1).unwrap();
//!
//! let mut sim = Simulator::new(project, SimulationConfig::default());
//! let summary = sim.execute().unwrap();
//! assert_eq!(summary.duration, 5);
//! assert_eq!(summary.total_cost, 10.0);
//! ```

pub mod batch;
pub mod config;
pub mod description;
pub mod engine;
pub mod error;
pub mod model;
pub mod results;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::config::SimulationConfig;
    pub use crate::engine::{run, Simulator, TickReport};
    pub use crate::error::{LoadError, ModelError, SimulationError};
    pub use crate::model::*;
    pub use crate::results::{SimulationReport, SimulationSummary};
}
