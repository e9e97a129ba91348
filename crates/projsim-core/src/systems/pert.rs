//! Live PERT schedule.
//!
//! Recomputed every tick from the current remaining work amounts. Each pass
//! first reseeds every task, then walks the graph frontier by frontier and
//! only overwrites a neighbour's value when the candidate is at least the
//! value it already holds, so within a pass a task waits for its latest
//! known neighbour. Nothing from the previous tick survives a pass.

use crate::model::{TaskId, Workflow};

/// Run the forward and backward passes.
pub fn update_pert(workflow: &mut Workflow, now: u32) {
    forward_pass(workflow, now as f64);
    backward_pass(workflow);
}

/// Earliest start/finish. Every task is reseeded to start at `now`; a
/// successor's `est` then moves to `pred.est + pred.remaining` whenever that
/// is not below it.
pub fn forward_pass(workflow: &mut Workflow, now: f64) {
    let mut frontier: Vec<TaskId> = Vec::new();
    for task in &mut workflow.tasks {
        task.est = now;
        task.eft = now + task.remaining_work_amount;
        if task.is_head() {
            frontier.push(task.id);
        }
    }

    while !frontier.is_empty() {
        let mut next: Vec<TaskId> = Vec::new();
        for &id in &frontier {
            let (est, remaining, successors) = {
                let t = workflow.task(id);
                (t.est, t.remaining_work_amount, t.successors.clone())
            };
            for succ in successors {
                let candidate = est + remaining;
                let s = workflow.task_mut(succ);
                if candidate >= s.est {
                    s.est = candidate;
                    s.eft = candidate + s.remaining_work_amount;
                }
                if !next.contains(&succ) {
                    next.push(succ);
                }
            }
        }
        frontier = next;
    }
}

/// Critical path length and latest start/finish. Tail tasks finish at the
/// critical path length; every other task is reseeded to zero and its `lft`
/// moves to `succ.lst` whenever that is not below it.
pub fn backward_pass(workflow: &mut Workflow) {
    let critical_path_length = workflow
        .tasks
        .iter()
        .filter(|t| t.is_tail())
        .map(|t| t.eft)
        .fold(0.0, f64::max);
    workflow.critical_path_length = critical_path_length;

    let mut frontier: Vec<TaskId> = Vec::new();
    for task in &mut workflow.tasks {
        if task.is_tail() {
            task.lft = critical_path_length;
            task.lst = critical_path_length - task.remaining_work_amount;
            frontier.push(task.id);
        } else {
            task.lft = 0.0;
            task.lst = 0.0;
        }
    }

    while !frontier.is_empty() {
        let mut next: Vec<TaskId> = Vec::new();
        for &id in &frontier {
            let (lst, predecessors) = {
                let t = workflow.task(id);
                (t.lst, t.predecessors.clone())
            };
            for pred in predecessors {
                let p = workflow.task_mut(pred);
                if lst >= p.lft {
                    p.lft = lst;
                    p.lst = lst - p.remaining_work_amount;
                }
                if !next.contains(&pred) {
                    next.push(pred);
                }
            }
        }
        frontier = next;
    }
}
