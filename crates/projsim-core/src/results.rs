//! Run results: summary scalars and per-entity time series.
//!
//! Everything here is `Serialize` so callers can persist it in whatever
//! format they need.

use crate::model::{ProjectModel, ResourceKind, TaskRef, TaskState};
use serde::{Deserialize, Serialize};

/// The four scalars a run reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Cost accrued by every worker and facility.
    pub total_cost: f64,
    /// Latest finish time across all tasks.
    pub duration: u32,
    /// Actual work of every task, rework included.
    pub total_work_amount: f64,
    /// Ticks the clock advanced.
    pub ticks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task: TaskRef,
    pub name: String,
    pub state: TaskState,
    pub actual_work_amount: f64,
    pub reworked: bool,
    pub ready_times: Vec<u32>,
    pub start_times: Vec<u32>,
    pub finish_times: Vec<u32>,
    /// Names of the allocated workers and facility.
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub name: String,
    pub team: String,
    pub kind: ResourceKind,
    pub total_cost: f64,
    pub start_times: Vec<u32>,
    pub finish_times: Vec<u32>,
    pub tasks: Vec<TaskRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub instance: usize,
    pub name: String,
    pub error: f64,
    pub total_error: f64,
    pub over_tolerance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub instance: usize,
    pub name: String,
    pub critical_path_length: f64,
    pub finish_time: Option<u32>,
}

/// Summary plus raw time series for detailed reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub summary: SimulationSummary,
    pub workflows: Vec<WorkflowRecord>,
    pub tasks: Vec<TaskRecord>,
    pub resources: Vec<ResourceRecord>,
    pub components: Vec<ComponentRecord>,
}

impl SimulationReport {
    pub fn new(project: &ProjectModel, summary: SimulationSummary) -> Self {
        let org = &project.organization;
        let mut workflows = Vec::new();
        let mut tasks = Vec::new();
        let mut components = Vec::new();

        for (index, instance) in project.instances.iter().enumerate() {
            let wf = &instance.workflow;
            workflows.push(WorkflowRecord {
                instance: index,
                name: wf.name.clone(),
                critical_path_length: wf.critical_path_length,
                finish_time: wf.finish_time(),
            });
            for t in &wf.tasks {
                tasks.push(TaskRecord {
                    task: TaskRef::new(index, t.id),
                    name: t.name.clone(),
                    state: t.state,
                    actual_work_amount: t.actual_work_amount,
                    reworked: t.rework_done,
                    ready_times: t.ready_times.clone(),
                    start_times: t.start_times.clone(),
                    finish_times: t.finish_times.clone(),
                    resources: t
                        .allocated_resources()
                        .map(|r| org.resource(r).name.clone())
                        .collect(),
                });
            }
            for c in instance.components.iter() {
                components.push(ComponentRecord {
                    instance: index,
                    name: c.name.clone(),
                    error: c.error,
                    total_error: instance.components.total_error(c.id),
                    over_tolerance: instance.components.is_over_tolerance(c.id),
                });
            }
        }

        let resources = org
            .resources
            .iter()
            .map(|r| ResourceRecord {
                name: r.name.clone(),
                team: org.team(r.team).name.clone(),
                kind: r.kind,
                total_cost: r.total_cost,
                start_times: r.start_times.clone(),
                finish_times: r.finish_times.clone(),
                tasks: r.assigned_tasks.clone(),
            })
            .collect();

        Self {
            summary,
            workflows,
            tasks,
            resources,
            components,
        }
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn reworked_tasks(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.iter().filter(|t| t.reworked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    #[test]
    fn test_report_collects_every_entity() {
        let mut org = Organization::new();
        let team = org.add_team("crew");
        let w = org.add_worker(team, "w", 1.0, SkillTable::new());
        let mut wf = Workflow::new("wf", 0.0);
        let a = wf.add_task("a", 1.0, team);
        let mut components = ComponentTree::new();
        let c = components.add("c", 0.5);
        let mut inst = WorkflowInstance::new(wf, components);
        inst.add_target(a, c);
        let mut project = ProjectModel::new(org, inst, 2, 1).unwrap();
        project.instances[1].workflow.tasks[0].workers.push(w);
        project.instances[1].components.components[0].error = 1.0;

        let summary = SimulationSummary {
            total_cost: 0.0,
            duration: 0,
            total_work_amount: 2.0,
            ticks: 0,
        };
        let report = SimulationReport::new(&project, summary);
        assert_eq!(report.workflows.len(), 2);
        assert_eq!(report.tasks.len(), 2);
        assert_eq!(report.tasks[1].resources, vec!["w".to_string()]);
        assert_eq!(report.resources[0].team, "crew");
        assert!(!report.components[0].over_tolerance);
        assert!(report.components[1].over_tolerance);
        assert_eq!(report.reworked_tasks().count(), 0);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"total_work_amount\": 2.0"));
    }
}
