//! Organization - the set of teams and the resource arena they share.

use super::ids::{ResourceId, TeamId};
use super::resource::{Resource, ResourceKind};
use super::skill::SkillTable;
use super::team::Team;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Organization {
    pub teams: Vec<Team>,
    /// Workers and facilities of every team.
    pub resources: Vec<Resource>,
}

impl Organization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_team(&mut self, name: impl Into<String>) -> TeamId {
        let id = TeamId(self.teams.len());
        self.teams.push(Team::new(id, name));
        id
    }

    pub fn add_worker(
        &mut self,
        team: TeamId,
        name: impl Into<String>,
        cost_per_time: f64,
        skills: SkillTable,
    ) -> ResourceId {
        self.add_resource(team, ResourceKind::Worker, name, cost_per_time, skills)
    }

    pub fn add_facility(
        &mut self,
        team: TeamId,
        name: impl Into<String>,
        cost_per_time: f64,
        skills: SkillTable,
    ) -> ResourceId {
        self.add_resource(team, ResourceKind::Facility, name, cost_per_time, skills)
    }

    fn add_resource(
        &mut self,
        team: TeamId,
        kind: ResourceKind,
        name: impl Into<String>,
        cost_per_time: f64,
        skills: SkillTable,
    ) -> ResourceId {
        let id = ResourceId(self.resources.len());
        self.resources
            .push(Resource::new(id, kind, name, team, cost_per_time, skills));
        let team = &mut self.teams[team.index()];
        match kind {
            ResourceKind::Worker => team.workers.push(id),
            ResourceKind::Facility => team.facilities.push(id),
        }
        id
    }

    pub fn team(&self, id: TeamId) -> &Team {
        &self.teams[id.index()]
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.index()]
    }

    pub fn resource_mut(&mut self, id: ResourceId) -> &mut Resource {
        &mut self.resources[id.index()]
    }

    pub fn find_team(&self, name: &str) -> Option<TeamId> {
        self.teams.iter().find(|t| t.name == name).map(|t| t.id)
    }

    pub fn initialize(&mut self) {
        for r in &mut self.resources {
            r.initialize();
        }
    }

    pub fn free_workers(&self) -> Vec<ResourceId> {
        self.teams
            .iter()
            .flat_map(|t| t.free_workers(&self.resources))
            .collect()
    }

    pub fn working_workers(&self) -> Vec<ResourceId> {
        self.teams
            .iter()
            .flat_map(|t| t.working_workers(&self.resources))
            .collect()
    }

    pub fn free_facilities(&self) -> Vec<ResourceId> {
        self.teams
            .iter()
            .flat_map(|t| t.free_facilities(&self.resources))
            .collect()
    }

    pub fn working_facilities(&self) -> Vec<ResourceId> {
        self.teams
            .iter()
            .flat_map(|t| t.working_facilities(&self.resources))
            .collect()
    }

    /// Sum of cost accrued by every resource.
    pub fn total_cost(&self) -> f64 {
        self.resources.iter().map(|r| r.total_cost).sum()
    }
}
