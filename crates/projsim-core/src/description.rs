//! Project description - the serde input format for building a model.
//!
//! Entities refer to each other by name. [`ProjectDescription::build`]
//! resolves names to arena handles, replicates the workflow and component
//! tree `replicates` times, and validates the result.
//!
//! ```
//! use projsim_core::description::ProjectDescription;
//!
//! let json = r#"{
//!     "teams": [{
//!         "name": "dev",
//!         "workers": [{ "name": "ann", "cost_per_time": 1.0,
//!                       "skills": { "code": { "work_rate": 1.0 } } }]
//!     }],
//!     "workflow": {
//!         "tasks": [{ "name": "code", "work_amount": 3.0, "team": "dev" }]
//!     }
//! }"#;
//! let project = ProjectDescription::from_json(json).unwrap().build().unwrap();
//! assert_eq!(project.instances.len(), 1);
//! ```

use crate::config::SimulationConfig;
use crate::error::{LoadError, ModelError};
use crate::model::{
    ComponentId, ComponentTree, Organization, ProjectModel, SkillTable, TaskId, Workflow,
    WorkflowInstance,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

fn one() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default = "one")]
    pub concurrency_limit: usize,
    #[serde(default = "one")]
    pub replicates: usize,
    /// Optional run settings bundled with the project.
    #[serde(default)]
    pub simulation: Option<SimulationConfig>,
    pub teams: Vec<TeamDescription>,
    pub workflow: WorkflowDescription,
    #[serde(default)]
    pub components: Vec<ComponentDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamDescription {
    pub name: String,
    #[serde(default)]
    pub workers: Vec<ResourceDescription>,
    #[serde(default)]
    pub facilities: Vec<ResourceDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescription {
    pub name: String,
    #[serde(default)]
    pub cost_per_time: f64,
    #[serde(default)]
    pub skills: SkillTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub due_date: f64,
    pub tasks: Vec<TaskDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDescription {
    pub name: String,
    pub work_amount: f64,
    #[serde(default)]
    pub additional_work_amount: f64,
    #[serde(default)]
    pub needs_facility: bool,
    /// Name of the team allocated to this task.
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub predecessors: Vec<String>,
    /// Names of components this task contributes error to.
    #[serde(default)]
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDescription {
    pub name: String,
    #[serde(default)]
    pub error_tolerance: f64,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl ProjectDescription {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Run settings bundled with the description, or the defaults.
    pub fn simulation_config(&self) -> SimulationConfig {
        self.simulation.clone().unwrap_or_default()
    }

    /// Resolve names and build a validated model.
    pub fn build(&self) -> Result<ProjectModel, ModelError> {
        let organization = self.build_organization()?;
        let template = self.build_instance(&organization)?;
        ProjectModel::new(organization, template, self.replicates, self.concurrency_limit)
    }

    fn build_organization(&self) -> Result<Organization, ModelError> {
        let mut org = Organization::new();
        let mut resource_names = HashSet::new();
        for team in &self.teams {
            if org.find_team(&team.name).is_some() {
                return Err(duplicate("team", &team.name));
            }
            let team_id = org.add_team(&team.name);
            for w in &team.workers {
                if !resource_names.insert(w.name.as_str()) {
                    return Err(duplicate("resource", &w.name));
                }
                org.add_worker(team_id, &w.name, w.cost_per_time, w.skills.clone());
            }
            for f in &team.facilities {
                if !resource_names.insert(f.name.as_str()) {
                    return Err(duplicate("resource", &f.name));
                }
                org.add_facility(team_id, &f.name, f.cost_per_time, f.skills.clone());
            }
        }
        Ok(org)
    }

    fn build_instance(&self, org: &Organization) -> Result<WorkflowInstance, ModelError> {
        let mut components = ComponentTree::new();
        let mut component_ids: HashMap<&str, ComponentId> = HashMap::new();
        for c in &self.components {
            if component_ids.contains_key(c.name.as_str()) {
                return Err(duplicate("component", &c.name));
            }
            let id = components.add(&c.name, c.error_tolerance);
            component_ids.insert(c.name.as_str(), id);
        }
        for c in &self.components {
            let id = component_ids[c.name.as_str()];
            for dep in &c.depends_on {
                let dep_id = *component_ids
                    .get(dep.as_str())
                    .ok_or_else(|| unknown("component", &c.name, "component", dep))?;
                components.add_dependency(id, dep_id);
            }
        }

        let wf_desc = &self.workflow;
        let mut workflow = Workflow::new(&wf_desc.name, wf_desc.due_date);
        let mut task_ids: HashMap<&str, TaskId> = HashMap::new();
        for t in &wf_desc.tasks {
            if task_ids.contains_key(t.name.as_str()) {
                return Err(duplicate("task", &t.name));
            }
            let team_name = t.team.as_deref().ok_or_else(|| ModelError::MissingTeam {
                task: t.name.clone(),
            })?;
            let team = org
                .find_team(team_name)
                .ok_or_else(|| unknown("task", &t.name, "team", team_name))?;
            let id = workflow.add_task(&t.name, t.work_amount, team);
            let task = workflow.task_mut(id);
            task.additional_work_amount = t.additional_work_amount;
            task.needs_facility = t.needs_facility;
            task_ids.insert(t.name.as_str(), id);
        }
        for t in &wf_desc.tasks {
            let id = task_ids[t.name.as_str()];
            for pred in &t.predecessors {
                let pred_id = *task_ids
                    .get(pred.as_str())
                    .ok_or_else(|| unknown("task", &t.name, "task", pred))?;
                workflow.add_dependency(pred_id, id);
            }
        }

        let mut instance = WorkflowInstance::new(workflow, components);
        for t in &wf_desc.tasks {
            let id = task_ids[t.name.as_str()];
            for target in &t.targets {
                let c = *component_ids
                    .get(target.as_str())
                    .ok_or_else(|| unknown("task", &t.name, "component", target))?;
                instance.add_target(id, c);
            }
        }
        Ok(instance)
    }
}

fn duplicate(kind: &'static str, name: &str) -> ModelError {
    ModelError::DuplicateName {
        kind,
        name: name.to_string(),
    }
}

fn unknown(kind: &'static str, from: &str, target_kind: &'static str, target: &str) -> ModelError {
    ModelError::UnknownReference {
        kind,
        from: from.to_string(),
        target_kind,
        target: target.to_string(),
    }
}
