//! Quality components and their error accumulation.
//!
//! Components form a DAG through "depends-on" edges. A component's total
//! error is its own accumulator plus the total error of everything it
//! depends on, recomputed on every query since errors change every tick.
//! The tree is checked acyclic when the project is built, so the recursion
//! here is unbounded.

use super::ids::{ComponentId, TaskId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A node in the quality-dependency tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    /// Total error above this value triggers rework on targeting tasks.
    pub error_tolerance: f64,
    pub depends_on: Vec<ComponentId>,
    pub depended_by: Vec<ComponentId>,
    /// Tasks that contribute error to this component.
    pub target_tasks: Vec<TaskId>,
    /// Local error accumulator.
    pub error: f64,
}

impl Component {
    pub fn new(id: ComponentId, name: impl Into<String>, error_tolerance: f64) -> Self {
        Self {
            id,
            name: name.into(),
            error_tolerance,
            depends_on: Vec::new(),
            depended_by: Vec::new(),
            target_tasks: Vec::new(),
            error: 0.0,
        }
    }
}

/// Owning arena for the components of one workflow instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentTree {
    pub components: Vec<Component>,
}

impl ComponentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component, assigning the next id.
    pub fn add(&mut self, name: impl Into<String>, error_tolerance: f64) -> ComponentId {
        let id = ComponentId(self.components.len());
        self.components.push(Component::new(id, name, error_tolerance));
        id
    }

    /// Record that `component` depends on `dependency`.
    pub fn add_dependency(&mut self, component: ComponentId, dependency: ComponentId) {
        self.components[component.index()].depends_on.push(dependency);
        self.components[dependency.index()].depended_by.push(component);
    }

    pub fn get(&self, id: ComponentId) -> &Component {
        &self.components[id.index()]
    }

    pub fn get_mut(&mut self, id: ComponentId) -> &mut Component {
        &mut self.components[id.index()]
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.components.iter().find(|c| c.name == name).map(|c| c.id)
    }

    /// Zero every accumulator.
    pub fn initialize(&mut self) {
        for c in &mut self.components {
            c.error = 0.0;
        }
    }

    /// With probability `1 - no_error_probability`, add one error to the
    /// component. Returns whether an error was recorded.
    pub fn update_error_value<R: Rng + ?Sized>(
        &mut self,
        id: ComponentId,
        no_error_probability: f64,
        rng: &mut R,
    ) -> bool {
        let p = no_error_probability.clamp(0.0, 1.0);
        if rng.gen_bool(p) {
            return false;
        }
        self.components[id.index()].error += 1.0;
        true
    }

    /// Local error plus the total error of every component it depends on.
    pub fn total_error(&self, id: ComponentId) -> f64 {
        let c = &self.components[id.index()];
        c.error + c.depends_on.iter().map(|&d| self.total_error(d)).sum::<f64>()
    }

    pub fn is_over_tolerance(&self, id: ComponentId) -> bool {
        self.total_error(id) > self.components[id.index()].error_tolerance
    }

    /// Zero the local error of `id` and, recursively, of everything it
    /// depends on.
    pub fn reset_error(&mut self, id: ComponentId) {
        self.components[id.index()].error = 0.0;
        let deps = self.components[id.index()].depends_on.clone();
        for d in deps {
            self.reset_error(d);
        }
    }
}
