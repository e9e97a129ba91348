//! Workflow concurrency admission.
//!
//! A task in an instance that has not started may only start while fewer
//! than `limit` instances are running. Tasks of an instance that is already
//! running are always admitted.

use crate::model::{ProjectModel, WorkflowStatus};

/// Tracks running instances during one allocation pass.
#[derive(Debug, Clone)]
pub struct Admission {
    limit: usize,
    running: Vec<bool>,
    running_count: usize,
}

impl Admission {
    /// Snapshot the running set of `project` at the start of a tick.
    pub fn new(project: &ProjectModel) -> Self {
        let running: Vec<bool> = project
            .instances
            .iter()
            .map(|i| i.status() == WorkflowStatus::Running)
            .collect();
        let running_count = running.iter().filter(|&&r| r).count();
        Self {
            limit: project.concurrency_limit,
            running,
            running_count,
        }
    }

    /// Whether a task of `instance` may start now.
    pub fn allows(&self, instance: usize) -> bool {
        self.running[instance] || self.running_count < self.limit
    }

    /// Mark `instance` as running once one of its tasks was allocated, so
    /// later tasks in the same pass see the updated count.
    pub fn admit(&mut self, instance: usize) {
        if !self.running[instance] {
            self.running[instance] = true;
            self.running_count += 1;
        }
    }

    pub fn running_count(&self) -> usize {
        self.running_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    fn project(instances: usize, limit: usize) -> ProjectModel {
        let mut org = Organization::new();
        let team = org.add_team("t");
        org.add_worker(team, "w", 1.0, SkillTable::new());
        let mut wf = Workflow::new("wf", 0.0);
        wf.add_task("a", 1.0, team);
        ProjectModel::new(org, WorkflowInstance::new(wf, ComponentTree::new()), instances, limit)
            .unwrap()
    }

    #[test]
    fn test_limit_one_admits_single_new_instance() {
        let p = project(2, 1);
        let mut adm = Admission::new(&p);
        assert!(adm.allows(0));
        adm.admit(0);
        assert!(adm.allows(0));
        assert!(!adm.allows(1));
        assert_eq!(adm.running_count(), 1);
    }

    #[test]
    fn test_limit_two_admits_both() {
        let p = project(2, 2);
        let mut adm = Admission::new(&p);
        adm.admit(0);
        assert!(adm.allows(1));
        adm.admit(1);
        assert_eq!(adm.running_count(), 2);
    }

    #[test]
    fn test_running_instance_always_admitted() {
        let mut p = project(3, 1);
        p.instances[2].workflow.tasks[0].state = TaskState::Working;
        let adm = Admission::new(&p);
        assert_eq!(adm.running_count(), 1);
        assert!(adm.allows(2));
        assert!(!adm.allows(0));
    }

    #[test]
    fn test_finished_instance_frees_slot() {
        let mut p = project(2, 1);
        p.instances[0].workflow.tasks[0].state = TaskState::Finished;
        let adm = Admission::new(&p);
        assert_eq!(adm.running_count(), 0);
        assert!(adm.allows(1));
    }

    #[test]
    fn test_admit_is_idempotent() {
        let p = project(2, 2);
        let mut adm = Admission::new(&p);
        adm.admit(1);
        adm.admit(1);
        assert_eq!(adm.running_count(), 1);
    }
}
