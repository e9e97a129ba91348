//! Workflow - an ordered task DAG with a live PERT schedule.

use super::ids::{TaskId, TeamId};
use super::task::{Task, TaskState};
use serde::{Deserialize, Serialize};

/// Coarse progress of a workflow, used for concurrency admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowStatus {
    /// Every task is `None` or `Ready`; no work has started.
    NotStarted,
    /// Some task is working or finished, but not all are finished.
    Running,
    Finished,
}

/// Owning arena for the tasks of one workflow instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    /// Allocation priority: earlier due dates are served first.
    pub due_date: f64,
    pub tasks: Vec<Task>,
    /// Max `eft` over tail tasks, recomputed every tick.
    pub critical_path_length: f64,
}

impl Workflow {
    pub fn new(name: impl Into<String>, due_date: f64) -> Self {
        Self {
            name: name.into(),
            due_date,
            tasks: Vec::new(),
            critical_path_length: 0.0,
        }
    }

    /// Append a task, assigning the next id.
    pub fn add_task(&mut self, name: impl Into<String>, work_amount: f64, team: TeamId) -> TaskId {
        let id = TaskId(self.tasks.len());
        self.tasks.push(Task::new(id, name, work_amount, team));
        id
    }

    /// Record that `successor` cannot become ready before `predecessor` finishes.
    pub fn add_dependency(&mut self, predecessor: TaskId, successor: TaskId) {
        self.tasks[predecessor.index()].successors.push(successor);
        self.tasks[successor.index()].predecessors.push(predecessor);
    }

    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id.index()]
    }

    pub fn task_mut(&mut self, id: TaskId) -> &mut Task {
        &mut self.tasks[id.index()]
    }

    pub fn find(&self, name: &str) -> Option<TaskId> {
        self.tasks.iter().find(|t| t.name == name).map(|t| t.id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Reset every task and the schedule.
    pub fn initialize(&mut self) {
        for task in &mut self.tasks {
            task.initialize();
        }
        self.critical_path_length = 0.0;
    }

    pub fn status(&self) -> WorkflowStatus {
        if self.is_finished() {
            return WorkflowStatus::Finished;
        }
        let started = self
            .tasks
            .iter()
            .any(|t| !matches!(t.state, TaskState::None | TaskState::Ready));
        if started {
            WorkflowStatus::Running
        } else {
            WorkflowStatus::NotStarted
        }
    }

    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(Task::is_finished)
    }

    pub fn is_running(&self) -> bool {
        self.status() == WorkflowStatus::Running
    }

    pub fn ready_tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.iter().filter(|t| t.is_ready()).map(|t| t.id)
    }

    pub fn working_tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.iter().filter(|t| t.is_working()).map(|t| t.id)
    }

    /// Tasks without predecessors.
    pub fn head_tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.iter().filter(|t| t.is_head()).map(|t| t.id)
    }

    /// Tasks without successors.
    pub fn tail_tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.iter().filter(|t| t.is_tail()).map(|t| t.id)
    }

    /// Latest finish time recorded by any task, or `None` if nothing finished.
    pub fn finish_time(&self) -> Option<u32> {
        self.tasks
            .iter()
            .filter_map(|t| t.finish_times.last().copied())
            .max()
    }

    pub fn total_actual_work_amount(&self) -> f64 {
        self.tasks.iter().map(|t| t.actual_work_amount).sum()
    }

    /// Recompute the PERT schedule against current remaining work.
    pub fn update_pert(&mut self, now: u32) {
        crate::systems::pert::update_pert(self, now);
    }
}
