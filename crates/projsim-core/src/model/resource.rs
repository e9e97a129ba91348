//! Workers and facilities.

use super::ids::{ResourceId, TaskRef, TeamId};
use super::skill::SkillTable;
use serde::{Deserialize, Serialize};

/// Kind of schedulable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Worker,
    Facility,
}

/// Whether a resource is available this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResourceState {
    #[default]
    Free,
    Working,
}

/// A worker or facility owned by exactly one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub kind: ResourceKind,
    pub name: String,
    /// Owning team, fixed at construction.
    pub team: TeamId,
    /// Cost accrued for every tick spent working.
    pub cost_per_time: f64,
    pub skills: SkillTable,

    // Mutable run state
    pub state: ResourceState,
    pub total_cost: f64,
    pub start_times: Vec<u32>,
    pub finish_times: Vec<u32>,
    /// Every task this resource was ever allocated to, in allocation order.
    pub assigned_tasks: Vec<TaskRef>,
}

impl Resource {
    pub fn new(
        id: ResourceId,
        kind: ResourceKind,
        name: impl Into<String>,
        team: TeamId,
        cost_per_time: f64,
        skills: SkillTable,
    ) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            team,
            cost_per_time,
            skills,
            state: ResourceState::Free,
            total_cost: 0.0,
            start_times: Vec::new(),
            finish_times: Vec::new(),
            assigned_tasks: Vec::new(),
        }
    }

    /// Reset every mutable field to its zero state.
    pub fn initialize(&mut self) {
        self.state = ResourceState::Free;
        self.total_cost = 0.0;
        self.start_times.clear();
        self.finish_times.clear();
        self.assigned_tasks.clear();
    }

    pub fn is_free(&self) -> bool {
        self.state == ResourceState::Free
    }

    pub fn is_working(&self) -> bool {
        self.state == ResourceState::Working
    }

    pub fn is_worker(&self) -> bool {
        self.kind == ResourceKind::Worker
    }

    pub fn is_facility(&self) -> bool {
        self.kind == ResourceKind::Facility
    }

    pub fn work_rate(&self, task_name: &str) -> f64 {
        self.skills.work_rate(task_name)
    }

    pub fn error_rate(&self, task_name: &str) -> f64 {
        self.skills.error_rate(task_name)
    }

    pub fn has_skill(&self, task_name: &str) -> bool {
        self.skills.has_skill(task_name)
    }

    /// Record an allocation without changing state; the task flips the
    /// resource to working when it actually starts.
    pub fn assign(&mut self, task: TaskRef) {
        self.assigned_tasks.push(task);
    }

    pub fn start(&mut self, time: u32) {
        self.state = ResourceState::Working;
        self.start_times.push(time);
    }

    pub fn finish(&mut self, time: u32) {
        self.state = ResourceState::Free;
        self.finish_times.push(time);
    }

    /// Accrue one tick of cost.
    pub fn accrue_cost(&mut self) {
        self.total_cost += self.cost_per_time;
    }
}
