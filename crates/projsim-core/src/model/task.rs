//! Task data and state predicates.
//!
//! The transitions themselves (ready, start, perform, finish, rework) live in
//! [`crate::systems::progress`] because they touch resources and components
//! owned elsewhere.

use super::ids::{ComponentId, ResourceId, TaskId, TeamId};
use serde::{Deserialize, Serialize};

/// Task lifecycle.
///
/// `None → Ready → Working → Finished`, with a single optional detour
/// `Working → WorkingAdditionally → Finished` when rework is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskState {
    #[default]
    None,
    Ready,
    Working,
    WorkingAdditionally,
    Finished,
}

impl TaskState {
    /// Work is being performed this tick.
    pub fn is_working(self) -> bool {
        matches!(self, TaskState::Working | TaskState::WorkingAdditionally)
    }
}

/// The unit of work in a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Work amount at the start of a run.
    pub default_work_amount: f64,
    /// Work added when the task is sent back for rework.
    pub additional_work_amount: f64,
    pub needs_facility: bool,
    pub predecessors: Vec<TaskId>,
    pub successors: Vec<TaskId>,
    pub team: TeamId,
    /// Components this task contributes error to.
    pub targets: Vec<ComponentId>,

    // Mutable run state
    pub state: TaskState,
    pub remaining_work_amount: f64,
    /// Default work plus any rework added.
    pub actual_work_amount: f64,
    pub est: f64,
    pub eft: f64,
    pub lst: f64,
    pub lft: f64,
    pub ready_times: Vec<u32>,
    pub start_times: Vec<u32>,
    pub finish_times: Vec<u32>,
    pub workers: Vec<ResourceId>,
    pub facility: Option<ResourceId>,
    /// Set once rework has fired; it cannot fire again this run.
    pub rework_done: bool,
}

impl Task {
    pub fn new(id: TaskId, name: impl Into<String>, work_amount: f64, team: TeamId) -> Self {
        Self {
            id,
            name: name.into(),
            default_work_amount: work_amount,
            additional_work_amount: 0.0,
            needs_facility: false,
            predecessors: Vec::new(),
            successors: Vec::new(),
            team,
            targets: Vec::new(),
            state: TaskState::None,
            remaining_work_amount: work_amount,
            actual_work_amount: work_amount,
            est: 0.0,
            eft: 0.0,
            lst: 0.0,
            lft: 0.0,
            ready_times: Vec::new(),
            start_times: Vec::new(),
            finish_times: Vec::new(),
            workers: Vec::new(),
            facility: None,
            rework_done: false,
        }
    }

    pub fn with_additional_work(mut self, amount: f64) -> Self {
        self.additional_work_amount = amount;
        self
    }

    pub fn with_facility(mut self, needs_facility: bool) -> Self {
        self.needs_facility = needs_facility;
        self
    }

    /// Reset every mutable field to its zero state.
    pub fn initialize(&mut self) {
        self.state = TaskState::None;
        self.remaining_work_amount = self.default_work_amount;
        self.actual_work_amount = self.default_work_amount;
        self.est = 0.0;
        self.eft = 0.0;
        self.lst = 0.0;
        self.lft = 0.0;
        self.ready_times.clear();
        self.start_times.clear();
        self.finish_times.clear();
        self.workers.clear();
        self.facility = None;
        self.rework_done = false;
    }

    /// `lst - est`; lower means more urgent.
    pub fn slack(&self) -> f64 {
        self.lst - self.est
    }

    pub fn is_head(&self) -> bool {
        self.predecessors.is_empty()
    }

    pub fn is_tail(&self) -> bool {
        self.successors.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.state == TaskState::Ready
    }

    pub fn is_working(&self) -> bool {
        self.state.is_working()
    }

    pub fn is_finished(&self) -> bool {
        self.state == TaskState::Finished
    }

    pub fn has_allocation(&self) -> bool {
        !self.workers.is_empty() || self.facility.is_some()
    }

    /// Every allocated resource, workers first.
    pub fn allocated_resources(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.workers.iter().copied().chain(self.facility)
    }

    /// Whether the run could send this task back for rework.
    pub fn can_rework(&self) -> bool {
        !self.rework_done && self.additional_work_amount > 0.0
    }
}
