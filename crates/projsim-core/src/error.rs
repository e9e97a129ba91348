//! Error types.

use thiserror::Error;

/// The project graph handed to the simulator is not well formed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("concurrency limit must be at least 1")]
    ZeroConcurrencyLimit,
    #[error("replicate count must be at least 1")]
    ZeroReplicates,
    #[error("project has no workflow instances")]
    NoInstances,
    #[error("task {task:?} has invalid work amount {amount}")]
    InvalidWorkAmount { task: String, amount: f64 },
    #[error("task {task:?} has invalid additional work amount {amount}")]
    InvalidAdditionalWorkAmount { task: String, amount: f64 },
    #[error("component {component:?} has invalid error tolerance {tolerance}")]
    InvalidTolerance { component: String, tolerance: f64 },
    #[error("resource {resource:?} has invalid cost per time {cost}")]
    InvalidCost { resource: String, cost: f64 },
    #[error("resource {resource:?} has invalid {field} {value} for task {task:?}")]
    InvalidSkill {
        resource: String,
        task: String,
        field: &'static str,
        value: f64,
    },
    #[error("task {task:?} is not assigned to a team")]
    MissingTeam { task: String },
    #[error("{kind} {from:?} refers to unknown {target_kind} {target:?}")]
    UnknownReference {
        kind: &'static str,
        from: String,
        target_kind: &'static str,
        target: String,
    },
    #[error("duplicate {kind} name {name:?}")]
    DuplicateName { kind: &'static str, name: String },
    #[error("{kind} link {from:?} -> {to:?} in workflow instance {instance} has no matching back link")]
    UnmirroredLink {
        instance: usize,
        kind: &'static str,
        from: String,
        to: String,
    },
    #[error("resource {resource:?} is listed by team {team:?} but does not belong there as a {role}")]
    TeamMembershipMismatch {
        resource: String,
        team: String,
        role: &'static str,
    },
    #[error("task dependency cycle through {task:?} in workflow instance {instance}")]
    TaskCycle { instance: usize, task: String },
    #[error("component dependency cycle through {component:?} in workflow instance {instance}")]
    ComponentCycle { instance: usize, component: String },
}

/// A run could not complete.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid project: {0}")]
    Model(#[from] ModelError),
    #[error("simulation exceeded the tick limit of {limit}")]
    TickLimitExceeded { limit: u32 },
    #[error("simulation stalled at tick {time}: {pending} unfinished tasks and nothing working")]
    Stalled { time: u32, pending: usize },
}

/// A project description could not be read or built.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read project description: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse project description: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
}
