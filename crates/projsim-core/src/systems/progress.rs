//! Task state transitions and per-tick work.
//!
//! Each function handles one sub-phase of a tick for a single workflow
//! instance and returns the tasks it moved. The engine calls them in a fixed
//! order; see [`crate::engine::Simulator::step`].

use crate::model::{
    ComponentId, ComponentTree, Organization, TaskId, TaskRef, TaskState, Workflow,
    WorkflowInstance,
};
use log::debug;
use rand::Rng;

/// `None -> Ready` for every task whose predecessors have all finished.
pub fn check_ready(workflow: &mut Workflow, time: u32) -> Vec<TaskId> {
    let newly_ready: Vec<TaskId> = workflow
        .tasks
        .iter()
        .filter(|t| t.state == TaskState::None)
        .filter(|t| {
            t.predecessors
                .iter()
                .all(|&p| workflow.task(p).is_finished())
        })
        .map(|t| t.id)
        .collect();

    for &id in &newly_ready {
        let task = workflow.task_mut(id);
        task.state = TaskState::Ready;
        task.ready_times.push(time);
    }
    newly_ready
}

/// `Ready -> Working` for every ready task holding at least one resource.
pub fn check_start(workflow: &mut Workflow, org: &mut Organization, time: u32) -> Vec<TaskId> {
    let mut started = Vec::new();
    for task in &mut workflow.tasks {
        if !task.is_ready() || !task.has_allocation() {
            continue;
        }
        task.state = TaskState::Working;
        task.start_times.push(time);
        for id in task.allocated_resources() {
            org.resource_mut(id).start(time);
        }
        started.push(task.id);
    }
    started
}

/// Reduce remaining work on every working task, accrue resource cost, and
/// draw one error trial per target component.
pub fn perform<R: Rng + ?Sized>(
    instance: &mut WorkflowInstance,
    org: &mut Organization,
    rng: &mut R,
) -> Vec<TaskId> {
    let WorkflowInstance {
        workflow,
        components,
    } = instance;

    let mut worked = Vec::new();
    for task in &mut workflow.tasks {
        if !task.is_working() {
            continue;
        }

        let mut produced: f64 = task
            .workers
            .iter()
            .map(|&w| org.resource(w).work_rate(&task.name))
            .sum();
        let mut no_error_probability = 1.0
            - task
                .workers
                .iter()
                .map(|&w| org.resource(w).error_rate(&task.name))
                .sum::<f64>();
        if task.needs_facility {
            if let Some(f) = task.facility {
                let facility = org.resource(f);
                produced *= facility.work_rate(&task.name);
                no_error_probability *= 1.0 - facility.error_rate(&task.name);
            }
        }

        task.remaining_work_amount -= produced;
        for id in task.allocated_resources() {
            org.resource_mut(id).accrue_cost();
        }
        for &target in &task.targets {
            components.update_error_value(target, no_error_probability, rng);
        }
        worked.push(task.id);
    }
    worked
}

/// Outcome of the finish check for one instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinishOutcome {
    pub finished: Vec<TaskId>,
    pub reworked: Vec<TaskId>,
}

/// `Working -> Finished` or `Working -> WorkingAdditionally`, and
/// `WorkingAdditionally -> Finished`, for tasks whose remaining work is used up.
///
/// Rework fires only from `Working`, only when `consider_rework` is set, the
/// task has additional work and has not been reworked yet, and some target
/// component is over tolerance. The task keeps its resources and restarts at
/// `time`.
pub fn check_finish(
    instance_index: usize,
    instance: &mut WorkflowInstance,
    org: &mut Organization,
    time: u32,
    consider_rework: bool,
) -> FinishOutcome {
    let WorkflowInstance {
        workflow,
        components,
    } = instance;

    let mut outcome = FinishOutcome::default();
    for task in &mut workflow.tasks {
        if !task.is_working() || task.remaining_work_amount > 0.0 {
            continue;
        }

        let rework = task.state == TaskState::Working
            && consider_rework
            && task.can_rework()
            && any_over_tolerance(components, &task.targets);

        if rework {
            task.state = TaskState::WorkingAdditionally;
            task.remaining_work_amount = task.additional_work_amount;
            task.actual_work_amount += task.additional_work_amount;
            task.rework_done = true;
            task.ready_times.push(time);
            task.start_times.push(time);
            for id in task.allocated_resources() {
                let r = org.resource_mut(id);
                r.finish(time);
                r.start(time);
            }
            debug!(
                "rework {} ({}) at {}: +{} work",
                TaskRef::new(instance_index, task.id),
                task.name,
                time,
                task.additional_work_amount
            );
            outcome.reworked.push(task.id);
        } else {
            task.state = TaskState::Finished;
            task.remaining_work_amount = 0.0;
            task.finish_times.push(time);
            for id in task.allocated_resources() {
                org.resource_mut(id).finish(time);
            }
            outcome.finished.push(task.id);
        }
    }
    outcome
}

fn any_over_tolerance(components: &ComponentTree, targets: &[ComponentId]) -> bool {
    targets.iter().any(|&c| components.is_over_tolerance(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        org: Organization,
        instance: WorkflowInstance,
        worker: ResourceId,
    }

    fn fixture(error_rate: f64) -> Fixture {
        let mut org = Organization::new();
        let team = org.add_team("t");
        let worker = org.add_worker(
            team,
            "w",
            3.0,
            SkillTable::new()
                .with("a", Skill::new(1.0, error_rate, 0.0))
                .with("b", Skill::new(2.0, error_rate, 0.0)),
        );
        let mut wf = Workflow::new("wf", 0.0);
        let a = wf.add_task("a", 2.0, team);
        let b = wf.add_task("b", 3.0, team);
        wf.add_dependency(a, b);
        wf.task_mut(a).additional_work_amount = 4.0;
        let mut components = ComponentTree::new();
        let c = components.add("c", 0.0);
        let mut instance = WorkflowInstance::new(wf, components);
        instance.add_target(a, c);
        Fixture {
            org,
            instance,
            worker,
        }
    }

    fn allocate_to(f: &mut Fixture, task: TaskId) {
        f.instance.workflow.task_mut(task).workers.push(f.worker);
        f.org.resource_mut(f.worker).assign(TaskRef::new(0, task));
    }

    #[test]
    fn test_ready_requires_finished_predecessors() {
        let mut f = fixture(0.0);
        let ready = check_ready(&mut f.instance.workflow, 0);
        assert_eq!(ready, vec![TaskId(0)]);
        assert_eq!(f.instance.workflow.task(TaskId(0)).ready_times, vec![0]);
        assert_eq!(f.instance.workflow.task(TaskId(1)).state, TaskState::None);

        f.instance.workflow.task_mut(TaskId(0)).state = TaskState::Finished;
        let ready = check_ready(&mut f.instance.workflow, 4);
        assert_eq!(ready, vec![TaskId(1)]);
        assert_eq!(f.instance.workflow.task(TaskId(1)).ready_times, vec![4]);
    }

    #[test]
    fn test_start_requires_allocation() {
        let mut f = fixture(0.0);
        check_ready(&mut f.instance.workflow, 0);
        assert!(check_start(&mut f.instance.workflow, &mut f.org, 0).is_empty());
        assert!(f.instance.workflow.task(TaskId(0)).is_ready());

        allocate_to(&mut f, TaskId(0));
        let started = check_start(&mut f.instance.workflow, &mut f.org, 0);
        assert_eq!(started, vec![TaskId(0)]);
        assert_eq!(f.instance.workflow.task(TaskId(0)).start_times, vec![0]);
        assert!(f.org.resource(f.worker).is_working());
        assert_eq!(f.org.resource(f.worker).start_times, vec![0]);
    }

    #[test]
    fn test_perform_reduces_work_and_accrues_cost() {
        let mut f = fixture(0.0);
        let mut rng = StdRng::seed_from_u64(0);
        check_ready(&mut f.instance.workflow, 0);
        allocate_to(&mut f, TaskId(0));
        check_start(&mut f.instance.workflow, &mut f.org, 0);

        perform(&mut f.instance, &mut f.org, &mut rng);
        assert_eq!(f.instance.workflow.task(TaskId(0)).remaining_work_amount, 1.0);
        assert_eq!(f.org.resource(f.worker).total_cost, 3.0);
        assert_eq!(f.instance.components.get(ComponentId(0)).error, 0.0);
    }

    #[test]
    fn test_perform_with_facility_multiplies() {
        let mut f = fixture(0.0);
        let team = TeamId(0);
        let rig = f.org.add_facility(
            team,
            "rig",
            1.0,
            SkillTable::new().with("a", Skill::new(0.5, 0.0, 0.0)),
        );
        let mut rng = StdRng::seed_from_u64(0);
        let a = TaskId(0);
        f.instance.workflow.task_mut(a).needs_facility = true;
        check_ready(&mut f.instance.workflow, 0);
        allocate_to(&mut f, a);
        f.instance.workflow.task_mut(a).facility = Some(rig);
        check_start(&mut f.instance.workflow, &mut f.org, 0);
        assert!(f.org.resource(rig).is_working());

        perform(&mut f.instance, &mut f.org, &mut rng);
        assert_eq!(f.instance.workflow.task(a).remaining_work_amount, 1.5);
        assert_eq!(f.org.resource(rig).total_cost, 1.0);
    }

    #[test]
    fn test_certain_error_accumulates() {
        let mut f = fixture(1.0);
        let mut rng = StdRng::seed_from_u64(0);
        check_ready(&mut f.instance.workflow, 0);
        allocate_to(&mut f, TaskId(0));
        check_start(&mut f.instance.workflow, &mut f.org, 0);
        perform(&mut f.instance, &mut f.org, &mut rng);
        perform(&mut f.instance, &mut f.org, &mut rng);
        assert_eq!(f.instance.components.get(ComponentId(0)).error, 2.0);
    }

    #[test]
    fn test_finish_clamps_and_frees() {
        let mut f = fixture(0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let b = TaskId(1);
        f.instance.workflow.task_mut(TaskId(0)).state = TaskState::Finished;
        check_ready(&mut f.instance.workflow, 0);
        allocate_to(&mut f, b);
        check_start(&mut f.instance.workflow, &mut f.org, 0);

        // 3.0 work at rate 2.0 overshoots on the second tick
        perform(&mut f.instance, &mut f.org, &mut rng);
        assert!(check_finish(0, &mut f.instance, &mut f.org, 1, false)
            .finished
            .is_empty());
        perform(&mut f.instance, &mut f.org, &mut rng);
        assert!(f.instance.workflow.task(b).remaining_work_amount < 0.0);
        let outcome = check_finish(0, &mut f.instance, &mut f.org, 2, false);
        assert_eq!(outcome.finished, vec![b]);

        let task = f.instance.workflow.task(b);
        assert_eq!(task.state, TaskState::Finished);
        assert_eq!(task.remaining_work_amount, 0.0);
        assert_eq!(task.finish_times, vec![2]);
        assert!(f.org.resource(f.worker).is_free());
        assert_eq!(f.org.resource(f.worker).finish_times, vec![2]);
    }

    #[test]
    fn test_rework_fires_once() {
        let mut f = fixture(1.0);
        let mut rng = StdRng::seed_from_u64(0);
        let a = TaskId(0);
        check_ready(&mut f.instance.workflow, 0);
        allocate_to(&mut f, a);
        check_start(&mut f.instance.workflow, &mut f.org, 0);

        perform(&mut f.instance, &mut f.org, &mut rng);
        perform(&mut f.instance, &mut f.org, &mut rng);
        let outcome = check_finish(0, &mut f.instance, &mut f.org, 2, true);
        assert_eq!(outcome.reworked, vec![a]);
        assert!(outcome.finished.is_empty());

        let task = f.instance.workflow.task(a);
        assert_eq!(task.state, TaskState::WorkingAdditionally);
        assert_eq!(task.remaining_work_amount, 4.0);
        assert_eq!(task.actual_work_amount, 6.0);
        assert_eq!(task.ready_times, vec![0, 2]);
        assert_eq!(task.start_times, vec![0, 2]);
        assert!(f.org.resource(f.worker).is_working());

        for _ in 0..4 {
            perform(&mut f.instance, &mut f.org, &mut rng);
        }
        let outcome = check_finish(0, &mut f.instance, &mut f.org, 6, true);
        assert_eq!(outcome.finished, vec![a]);
        assert!(outcome.reworked.is_empty());
        assert_eq!(f.instance.workflow.task(a).actual_work_amount, 6.0);
    }

    #[test]
    fn test_rework_disabled_finishes_normally() {
        let mut f = fixture(1.0);
        let mut rng = StdRng::seed_from_u64(0);
        check_ready(&mut f.instance.workflow, 0);
        allocate_to(&mut f, TaskId(0));
        check_start(&mut f.instance.workflow, &mut f.org, 0);
        perform(&mut f.instance, &mut f.org, &mut rng);
        perform(&mut f.instance, &mut f.org, &mut rng);
        let outcome = check_finish(0, &mut f.instance, &mut f.org, 2, false);
        assert_eq!(outcome.finished, vec![TaskId(0)]);
    }

    #[test]
    fn test_no_rework_within_tolerance() {
        let mut f = fixture(0.0);
        let mut rng = StdRng::seed_from_u64(0);
        check_ready(&mut f.instance.workflow, 0);
        allocate_to(&mut f, TaskId(0));
        check_start(&mut f.instance.workflow, &mut f.org, 0);
        perform(&mut f.instance, &mut f.org, &mut rng);
        perform(&mut f.instance, &mut f.org, &mut rng);
        let outcome = check_finish(0, &mut f.instance, &mut f.org, 2, true);
        assert_eq!(outcome.finished, vec![TaskId(0)]);
        assert_eq!(f.instance.workflow.task(TaskId(0)).actual_work_amount, 2.0);
    }
}
