//! ProjectModel - the complete simulation input.
//!
//! Holds the organization plus N independent workflow instances (each a
//! workflow and its own component tree) and the limit on how many instances
//! may be running at once. Construction validates the graph; nothing after
//! that point re-checks it.

use super::component::ComponentTree;
use super::ids::{ComponentId, TaskId, TeamId};
use super::organization::Organization;
use super::resource::ResourceKind;
use super::workflow::{Workflow, WorkflowStatus};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One replicate: a task DAG paired with the component tree it targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInstance {
    pub workflow: Workflow,
    pub components: ComponentTree,
}

impl WorkflowInstance {
    pub fn new(workflow: Workflow, components: ComponentTree) -> Self {
        Self {
            workflow,
            components,
        }
    }

    /// Point `task` at `component` so its errors accumulate there.
    pub fn add_target(&mut self, task: TaskId, component: ComponentId) {
        self.workflow.task_mut(task).targets.push(component);
        self.components.get_mut(component).target_tasks.push(task);
    }

    pub fn initialize(&mut self) {
        self.workflow.initialize();
        self.components.initialize();
    }

    pub fn status(&self) -> WorkflowStatus {
        self.workflow.status()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectModel {
    pub organization: Organization,
    pub instances: Vec<WorkflowInstance>,
    /// Max number of instances allowed to be running simultaneously.
    pub concurrency_limit: usize,
}

impl ProjectModel {
    /// Replicate `template` `replicates` times and validate the result.
    pub fn new(
        organization: Organization,
        template: WorkflowInstance,
        replicates: usize,
        concurrency_limit: usize,
    ) -> Result<Self, ModelError> {
        if replicates == 0 {
            return Err(ModelError::ZeroReplicates);
        }
        let instances = vec![template; replicates];
        Self::from_instances(organization, instances, concurrency_limit)
    }

    /// Build from explicit instances (they need not share a topology).
    pub fn from_instances(
        organization: Organization,
        instances: Vec<WorkflowInstance>,
        concurrency_limit: usize,
    ) -> Result<Self, ModelError> {
        let model = Self {
            organization,
            instances,
            concurrency_limit,
        };
        model.validate()?;
        Ok(model)
    }

    /// Reset all mutable state so the same topology can be run again.
    pub fn initialize(&mut self) {
        self.organization.initialize();
        for instance in &mut self.instances {
            instance.initialize();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.instances.iter().all(|i| i.workflow.is_finished())
    }

    pub fn running_count(&self) -> usize {
        self.instances
            .iter()
            .filter(|i| i.status() == WorkflowStatus::Running)
            .count()
    }

    pub fn total_cost(&self) -> f64 {
        self.organization.total_cost()
    }

    /// Max finish time across every task of every instance.
    pub fn duration(&self) -> u32 {
        self.instances
            .iter()
            .filter_map(|i| i.workflow.finish_time())
            .max()
            .unwrap_or(0)
    }

    pub fn total_actual_work_amount(&self) -> f64 {
        self.instances
            .iter()
            .map(|i| i.workflow.total_actual_work_amount())
            .sum()
    }

    pub fn task_count(&self) -> usize {
        self.instances.iter().map(|i| i.workflow.len()).sum()
    }

    /// Check every structural and numeric constraint.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.concurrency_limit == 0 {
            return Err(ModelError::ZeroConcurrencyLimit);
        }
        if self.instances.is_empty() {
            return Err(ModelError::NoInstances);
        }
        self.validate_organization()?;
        for (index, instance) in self.instances.iter().enumerate() {
            self.validate_instance(index, instance)?;
        }
        Ok(())
    }

    fn validate_organization(&self) -> Result<(), ModelError> {
        let org = &self.organization;
        for r in &org.resources {
            if !(r.cost_per_time.is_finite() && r.cost_per_time >= 0.0) {
                return Err(ModelError::InvalidCost {
                    resource: r.name.clone(),
                    cost: r.cost_per_time,
                });
            }
            if r.team.index() >= org.teams.len() {
                return Err(unknown("resource", &r.name, "team", r.team));
            }
            for (task, skill) in r.skills.iter() {
                let checks = [
                    ("work rate", skill.work_rate, f64::INFINITY),
                    ("error rate", skill.error_rate, 1.0),
                    ("error detect rate", skill.error_detect_rate, 1.0),
                ];
                for (field, value, max) in checks {
                    if !(value.is_finite() && (0.0..=max).contains(&value)) {
                        return Err(ModelError::InvalidSkill {
                            resource: r.name.clone(),
                            task: task.to_string(),
                            field,
                            value,
                        });
                    }
                }
            }
        }
        for team in &org.teams {
            for id in team.members() {
                if id.index() >= org.resources.len() {
                    return Err(unknown("team", &team.name, "resource", id));
                }
            }
        }
        for (t, team) in org.teams.iter().enumerate() {
            let lists = [
                (&team.workers, ResourceKind::Worker, "worker"),
                (&team.facilities, ResourceKind::Facility, "facility"),
            ];
            for (ids, kind, role) in lists {
                for &id in ids {
                    let r = org.resource(id);
                    if r.team != TeamId(t) || r.kind != kind {
                        return Err(membership_mismatch(r.name.as_str(), team.name.as_str(), role));
                    }
                }
            }
        }
        // every resource must be reachable through its own team's lists
        for r in &org.resources {
            let team = org.team(r.team);
            let listed = match r.kind {
                ResourceKind::Worker => team.workers.contains(&r.id),
                ResourceKind::Facility => team.facilities.contains(&r.id),
            };
            if !listed {
                let role = match r.kind {
                    ResourceKind::Worker => "worker",
                    ResourceKind::Facility => "facility",
                };
                return Err(membership_mismatch(r.name.as_str(), team.name.as_str(), role));
            }
        }
        Ok(())
    }

    fn validate_instance(&self, index: usize, instance: &WorkflowInstance) -> Result<(), ModelError> {
        let tasks = &instance.workflow.tasks;
        let components = &instance.components.components;

        for task in tasks {
            if !(task.default_work_amount.is_finite() && task.default_work_amount >= 0.0) {
                return Err(ModelError::InvalidWorkAmount {
                    task: task.name.clone(),
                    amount: task.default_work_amount,
                });
            }
            if !(task.additional_work_amount.is_finite() && task.additional_work_amount >= 0.0) {
                return Err(ModelError::InvalidAdditionalWorkAmount {
                    task: task.name.clone(),
                    amount: task.additional_work_amount,
                });
            }
            if task.team.index() >= self.organization.teams.len() {
                return Err(ModelError::MissingTeam {
                    task: task.name.clone(),
                });
            }
            for &peer in task.predecessors.iter().chain(&task.successors) {
                if peer.index() >= tasks.len() {
                    return Err(unknown("task", &task.name, "task", peer));
                }
            }
            for &target in &task.targets {
                if target.index() >= components.len() {
                    return Err(unknown("task", &task.name, "component", target));
                }
            }
        }

        for c in components {
            if !(c.error_tolerance.is_finite() && c.error_tolerance >= 0.0) {
                return Err(ModelError::InvalidTolerance {
                    component: c.name.clone(),
                    tolerance: c.error_tolerance,
                });
            }
            for &peer in c.depends_on.iter().chain(&c.depended_by) {
                if peer.index() >= components.len() {
                    return Err(unknown("component", &c.name, "component", peer));
                }
            }
            for &task in &c.target_tasks {
                if task.index() >= tasks.len() {
                    return Err(unknown("component", &c.name, "task", task));
                }
            }
        }

        for (i, task) in tasks.iter().enumerate() {
            let id = TaskId(i);
            for &p in &task.predecessors {
                if !tasks[p.index()].successors.contains(&id) {
                    return Err(unmirrored(index, "task", &tasks[p.index()].name, &task.name));
                }
            }
            for &s in &task.successors {
                if !tasks[s.index()].predecessors.contains(&id) {
                    return Err(unmirrored(index, "task", &task.name, &tasks[s.index()].name));
                }
            }
        }
        for (i, c) in components.iter().enumerate() {
            let id = ComponentId(i);
            for &d in &c.depends_on {
                if !components[d.index()].depended_by.contains(&id) {
                    return Err(unmirrored(index, "component", &c.name, &components[d.index()].name));
                }
            }
            for &d in &c.depended_by {
                if !components[d.index()].depends_on.contains(&id) {
                    return Err(unmirrored(index, "component", &components[d.index()].name, &c.name));
                }
            }
        }

        // links are mirrored, so one direction covers every cycle
        let task_edges: Vec<Vec<usize>> = tasks
            .iter()
            .map(|t| t.successors.iter().map(|s| s.index()).collect())
            .collect();
        if let Some(node) = find_cycle(&task_edges) {
            return Err(ModelError::TaskCycle {
                instance: index,
                task: tasks[node].name.clone(),
            });
        }

        let component_edges: Vec<Vec<usize>> = components
            .iter()
            .map(|c| c.depends_on.iter().map(|d| d.index()).collect())
            .collect();
        if let Some(node) = find_cycle(&component_edges) {
            return Err(ModelError::ComponentCycle {
                instance: index,
                component: components[node].name.clone(),
            });
        }
        Ok(())
    }
}

fn unknown(kind: &'static str, from: &str, target_kind: &'static str, target: impl ToString) -> ModelError {
    ModelError::UnknownReference {
        kind,
        from: from.to_string(),
        target_kind,
        target: target.to_string(),
    }
}

fn unmirrored(instance: usize, kind: &'static str, from: &str, to: &str) -> ModelError {
    ModelError::UnmirroredLink {
        instance,
        kind,
        from: from.to_string(),
        to: to.to_string(),
    }
}

fn membership_mismatch(resource: &str, team: &str, role: &'static str) -> ModelError {
    ModelError::TeamMembershipMismatch {
        resource: resource.to_string(),
        team: team.to_string(),
        role,
    }
}

/// Kahn's algorithm over an adjacency list. Returns a node left on a cycle.
fn find_cycle(edges: &[Vec<usize>]) -> Option<usize> {
    let mut in_degree = vec![0usize; edges.len()];
    for targets in edges {
        for &t in targets {
            in_degree[t] += 1;
        }
    }
    let mut queue: VecDeque<usize> = (0..edges.len()).filter(|&n| in_degree[n] == 0).collect();
    let mut visited = 0;
    while let Some(node) = queue.pop_front() {
        visited += 1;
        for &t in &edges[node] {
            in_degree[t] -= 1;
            if in_degree[t] == 0 {
                queue.push_back(t);
            }
        }
    }
    if visited == edges.len() {
        None
    } else {
        in_degree.iter().position(|&d| d > 0)
    }
}
