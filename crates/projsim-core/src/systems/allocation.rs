//! Greedy resource allocation.
//!
//! Ready tasks are served most-urgent first (earliest due date, then least
//! slack). Each takes the first free worker of its team with a positive work
//! rate for it, preferring narrowly skilled resources, plus a matching
//! facility when it needs one. A task that needs a facility and cannot get one
//! takes no worker either. No backtracking.

use super::admission::Admission;
use crate::model::{ProjectModel, Resource, ResourceId, TaskRef};
use log::debug;
use std::cmp::Ordering;

/// One committed assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub task: TaskRef,
    pub worker: ResourceId,
    pub facility: Option<ResourceId>,
}

/// Ready tasks of every instance without an allocation, in priority order.
pub fn prioritized_ready_tasks(project: &ProjectModel) -> Vec<TaskRef> {
    let mut tasks: Vec<(TaskRef, f64, f64)> = project
        .instances
        .iter()
        .enumerate()
        .flat_map(|(index, instance)| {
            let wf = &instance.workflow;
            wf.tasks
                .iter()
                .filter(|t| t.is_ready() && !t.has_allocation())
                .map(move |t| (TaskRef::new(index, t.id), wf.due_date, t.slack()))
        })
        .collect();

    tasks.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.2.total_cmp(&b.2)));
    tasks.into_iter().map(|(task, _, _)| task).collect()
}

/// Order resources by total work-rate skill, narrowest first.
pub fn sort_by_skill_breadth(ids: &mut [ResourceId], resources: &[Resource]) {
    ids.sort_by(|a, b| {
        let sa = resources[a.index()].skills.total_work_rate();
        let sb = resources[b.index()].skills.total_work_rate();
        sa.partial_cmp(&sb).unwrap_or(Ordering::Equal)
    });
}

/// Allocate free resources to ready tasks. Returns what was committed.
pub fn allocate(project: &mut ProjectModel) -> Vec<Allocation> {
    let tasks = prioritized_ready_tasks(project);
    if tasks.is_empty() {
        return Vec::new();
    }

    let mut free_workers = project.organization.free_workers();
    let mut free_facilities = project.organization.free_facilities();
    sort_by_skill_breadth(&mut free_workers, &project.organization.resources);
    sort_by_skill_breadth(&mut free_facilities, &project.organization.resources);

    let mut admission = Admission::new(project);
    let mut committed = Vec::new();

    for task_ref in tasks {
        if free_workers.is_empty() {
            break;
        }
        if !admission.allows(task_ref.instance) {
            continue;
        }

        let resources = &project.organization.resources;
        let task = project.instances[task_ref.instance]
            .workflow
            .task(task_ref.task);
        let matches = |id: &ResourceId| {
            let r = &resources[id.index()];
            r.team == task.team && r.has_skill(&task.name)
        };

        let Some(worker_pos) = free_workers.iter().position(matches) else {
            continue;
        };
        let facility_pos = if task.needs_facility {
            match free_facilities.iter().position(matches) {
                Some(pos) => Some(pos),
                None => continue,
            }
        } else {
            None
        };

        let worker = free_workers.remove(worker_pos);
        let facility = facility_pos.map(|pos| free_facilities.remove(pos));

        let task = project.instances[task_ref.instance]
            .workflow
            .task_mut(task_ref.task);
        task.workers.push(worker);
        task.facility = facility;

        let org = &mut project.organization;
        org.resource_mut(worker).assign(task_ref);
        if let Some(f) = facility {
            org.resource_mut(f).assign(task_ref);
        }

        admission.admit(task_ref.instance);
        debug!(
            "allocated {} to {} (facility: {:?})",
            org.resource(worker).name,
            task_ref,
            facility.map(|f| org.resource(f).name.clone())
        );
        committed.push(Allocation {
            task: task_ref,
            worker,
            facility,
        });
    }

    committed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    fn skills(names: &[&str]) -> SkillTable {
        names
            .iter()
            .map(|n| (*n, Skill::with_work_rate(1.0)))
            .collect()
    }

    fn make_ready(project: &mut ProjectModel) {
        for inst in &mut project.instances {
            for t in &mut inst.workflow.tasks {
                t.state = TaskState::Ready;
            }
        }
    }

    #[test]
    fn test_earlier_due_date_wins() {
        let mut org = Organization::new();
        let team = org.add_team("t");
        let w = org.add_worker(team, "w", 1.0, skills(&["job"]));

        let mut late = Workflow::new("late", 10.0);
        late.add_task("job", 1.0, team);
        let mut early = Workflow::new("early", 5.0);
        early.add_task("job", 1.0, team);

        let mut project = ProjectModel::from_instances(
            org,
            vec![
                WorkflowInstance::new(late, ComponentTree::new()),
                WorkflowInstance::new(early, ComponentTree::new()),
            ],
            2,
        )
        .unwrap();
        make_ready(&mut project);

        let allocs = allocate(&mut project);
        assert_eq!(allocs.len(), 1);
        assert_eq!(allocs[0].task, TaskRef::new(1, TaskId(0)));
        assert_eq!(allocs[0].worker, w);
        assert!(project.instances[0].workflow.tasks[0].workers.is_empty());
    }

    #[test]
    fn test_least_slack_breaks_due_date_tie() {
        let mut org = Organization::new();
        let team = org.add_team("t");
        org.add_worker(team, "w", 1.0, skills(&["a", "b"]));
        let mut wf = Workflow::new("wf", 0.0);
        let a = wf.add_task("a", 1.0, team);
        let b = wf.add_task("b", 1.0, team);
        let mut project =
            ProjectModel::new(org, WorkflowInstance::new(wf, ComponentTree::new()), 1, 1).unwrap();
        make_ready(&mut project);
        let tasks = &mut project.instances[0].workflow.tasks;
        tasks[a.index()].lst = 4.0;
        tasks[b.index()].lst = 1.0;

        let allocs = allocate(&mut project);
        assert_eq!(allocs.len(), 1);
        assert_eq!(allocs[0].task.task, b);
    }

    #[test]
    fn test_narrow_worker_preferred() {
        let mut org = Organization::new();
        let team = org.add_team("t");
        let _broad = org.add_worker(team, "broad", 1.0, skills(&["a", "b", "c"]));
        let narrow = org.add_worker(team, "narrow", 1.0, skills(&["a"]));
        let mut wf = Workflow::new("wf", 0.0);
        wf.add_task("a", 1.0, team);
        let mut project =
            ProjectModel::new(org, WorkflowInstance::new(wf, ComponentTree::new()), 1, 1).unwrap();
        make_ready(&mut project);

        let allocs = allocate(&mut project);
        assert_eq!(allocs[0].worker, narrow);
    }

    #[test]
    fn test_worker_without_skill_is_skipped() {
        let mut org = Organization::new();
        let team = org.add_team("t");
        org.add_worker(team, "w", 1.0, skills(&["other"]));
        let mut wf = Workflow::new("wf", 0.0);
        wf.add_task("a", 1.0, team);
        let mut project =
            ProjectModel::new(org, WorkflowInstance::new(wf, ComponentTree::new()), 1, 1).unwrap();
        make_ready(&mut project);
        assert!(allocate(&mut project).is_empty());
    }

    #[test]
    fn test_other_team_not_used() {
        let mut org = Organization::new();
        let mine = org.add_team("mine");
        let theirs = org.add_team("theirs");
        org.add_worker(theirs, "w", 1.0, skills(&["a"]));
        let mut wf = Workflow::new("wf", 0.0);
        wf.add_task("a", 1.0, mine);
        let mut project =
            ProjectModel::new(org, WorkflowInstance::new(wf, ComponentTree::new()), 1, 1).unwrap();
        make_ready(&mut project);
        assert!(allocate(&mut project).is_empty());
    }

    #[test]
    fn test_facility_pairing_is_atomic() {
        let mut org = Organization::new();
        let team = org.add_team("t");
        let w = org.add_worker(team, "w", 1.0, skills(&["weld", "paint"]));
        org.add_facility(team, "booth", 1.0, skills(&["paint"]));
        let mut wf = Workflow::new("wf", 0.0);
        let weld = wf.add_task("weld", 1.0, team);
        wf.task_mut(weld).needs_facility = true;
        let mut project =
            ProjectModel::new(org, WorkflowInstance::new(wf, ComponentTree::new()), 1, 1).unwrap();
        make_ready(&mut project);

        assert!(allocate(&mut project).is_empty());
        let task = &project.instances[0].workflow.tasks[0];
        assert!(task.workers.is_empty());
        assert!(task.facility.is_none());
        assert!(project.organization.resource(w).assigned_tasks.is_empty());
    }

    #[test]
    fn test_facility_assigned_with_worker() {
        let mut org = Organization::new();
        let team = org.add_team("t");
        let w = org.add_worker(team, "w", 1.0, skills(&["weld"]));
        let f = org.add_facility(team, "rig", 1.0, skills(&["weld"]));
        let mut wf = Workflow::new("wf", 0.0);
        let weld = wf.add_task("weld", 1.0, team);
        wf.task_mut(weld).needs_facility = true;
        let mut project =
            ProjectModel::new(org, WorkflowInstance::new(wf, ComponentTree::new()), 1, 1).unwrap();
        make_ready(&mut project);

        let allocs = allocate(&mut project);
        assert_eq!(
            allocs,
            vec![Allocation {
                task: TaskRef::new(0, weld),
                worker: w,
                facility: Some(f),
            }]
        );
        assert_eq!(
            project.organization.resource(f).assigned_tasks,
            vec![TaskRef::new(0, weld)]
        );
    }

    #[test]
    fn test_worker_used_once_per_tick() {
        let mut org = Organization::new();
        let team = org.add_team("t");
        org.add_worker(team, "w", 1.0, skills(&["a", "b"]));
        let mut wf = Workflow::new("wf", 0.0);
        wf.add_task("a", 1.0, team);
        wf.add_task("b", 1.0, team);
        let mut project =
            ProjectModel::new(org, WorkflowInstance::new(wf, ComponentTree::new()), 1, 1).unwrap();
        make_ready(&mut project);
        assert_eq!(allocate(&mut project).len(), 1);
    }

    #[test]
    fn test_admission_gates_new_instances() {
        let mut org = Organization::new();
        let team = org.add_team("t");
        org.add_worker(team, "w0", 1.0, skills(&["a"]));
        org.add_worker(team, "w1", 1.0, skills(&["a"]));
        let mut wf = Workflow::new("wf", 0.0);
        wf.add_task("a", 1.0, team);
        let mut project =
            ProjectModel::new(org, WorkflowInstance::new(wf, ComponentTree::new()), 2, 1).unwrap();
        make_ready(&mut project);

        let allocs = allocate(&mut project);
        assert_eq!(allocs.len(), 1);
        assert_eq!(allocs[0].task.instance, 0);
    }

    #[test]
    fn test_skill_breadth_sort_is_stable() {
        let mut org = Organization::new();
        let team = org.add_team("t");
        let a = org.add_worker(team, "a", 1.0, skills(&["x"]));
        let b = org.add_worker(team, "b", 1.0, skills(&["y"]));
        let c = org.add_worker(team, "c", 1.0, SkillTable::new());
        let mut ids = vec![a, b, c];
        sort_by_skill_breadth(&mut ids, &org.resources);
        assert_eq!(ids, vec![c, a, b]);
    }
}
