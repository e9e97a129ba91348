//! Teams own pools of workers and facilities.

use super::ids::{ResourceId, TeamId};
use super::resource::Resource;
use serde::{Deserialize, Serialize};

/// A named group of resources. Membership is fixed after construction; the
/// resources themselves live in the organization arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub workers: Vec<ResourceId>,
    pub facilities: Vec<ResourceId>,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            workers: Vec::new(),
            facilities: Vec::new(),
        }
    }

    /// All members, workers first.
    pub fn members(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.workers.iter().chain(self.facilities.iter()).copied()
    }

    pub fn free_workers(&self, resources: &[Resource]) -> Vec<ResourceId> {
        filter_state(&self.workers, resources, Resource::is_free)
    }

    pub fn working_workers(&self, resources: &[Resource]) -> Vec<ResourceId> {
        filter_state(&self.workers, resources, Resource::is_working)
    }

    pub fn free_facilities(&self, resources: &[Resource]) -> Vec<ResourceId> {
        filter_state(&self.facilities, resources, Resource::is_free)
    }

    pub fn working_facilities(&self, resources: &[Resource]) -> Vec<ResourceId> {
        filter_state(&self.facilities, resources, Resource::is_working)
    }

    /// Total cost accrued by every member.
    pub fn total_cost(&self, resources: &[Resource]) -> f64 {
        self.members().map(|id| resources[id.index()].total_cost).sum()
    }
}

fn filter_state(
    ids: &[ResourceId],
    resources: &[Resource],
    pred: impl Fn(&Resource) -> bool,
) -> Vec<ResourceId> {
    ids.iter()
        .copied()
        .filter(|id| pred(&resources[id.index()]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::resource::ResourceKind;
    use crate::model::skill::SkillTable;

    fn setup() -> (Team, Vec<Resource>) {
        let mut team = Team::new(TeamId(0), "build");
        let mut resources = Vec::new();
        for (i, kind) in [ResourceKind::Worker, ResourceKind::Worker, ResourceKind::Facility]
            .into_iter()
            .enumerate()
        {
            let id = ResourceId(i);
            resources.push(Resource::new(id, kind, format!("r{i}"), TeamId(0), 1.0, SkillTable::new()));
            match kind {
                ResourceKind::Worker => team.workers.push(id),
                ResourceKind::Facility => team.facilities.push(id),
            }
        }
        (team, resources)
    }

    #[test]
    fn test_free_and_working_queries() {
        let (team, mut resources) = setup();
        assert_eq!(team.free_workers(&resources), vec![ResourceId(0), ResourceId(1)]);
        resources[1].start(0);
        assert_eq!(team.free_workers(&resources), vec![ResourceId(0)]);
        assert_eq!(team.working_workers(&resources), vec![ResourceId(1)]);
        assert_eq!(team.free_facilities(&resources), vec![ResourceId(2)]);
        assert!(team.working_facilities(&resources).is_empty());
    }

    #[test]
    fn test_total_cost() {
        let (team, mut resources) = setup();
        resources[0].accrue_cost();
        resources[2].accrue_cost();
        assert_eq!(team.total_cost(&resources), 2.0);
        assert_eq!(team.members().count(), 3);
    }
}
