//! Per-resource skill tables keyed by task name.
//!
//! A missing key means "no skill": every coefficient reads as `0.0`. The
//! allocator relies on this to skip resources that cannot work a task.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coefficients a resource has for one task name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// Work produced per tick.
    #[serde(default)]
    pub work_rate: f64,
    /// Probability (0.0–1.0) of introducing an error per tick.
    #[serde(default)]
    pub error_rate: f64,
    /// Probability (0.0–1.0) of detecting an error per tick.
    #[serde(default)]
    pub error_detect_rate: f64,
}

impl Skill {
    pub fn new(work_rate: f64, error_rate: f64, error_detect_rate: f64) -> Self {
        Self {
            work_rate,
            error_rate,
            error_detect_rate,
        }
    }

    /// Skill that only carries a work rate.
    pub fn with_work_rate(work_rate: f64) -> Self {
        Self {
            work_rate,
            ..Default::default()
        }
    }
}

/// Mapping from task name to [`Skill`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillTable {
    skills: BTreeMap<String, Skill>,
}

impl SkillTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, task_name: impl Into<String>, skill: Skill) -> Self {
        self.set(task_name, skill);
        self
    }

    pub fn set(&mut self, task_name: impl Into<String>, skill: Skill) {
        self.skills.insert(task_name.into(), skill);
    }

    pub fn get(&self, task_name: &str) -> Option<&Skill> {
        self.skills.get(task_name)
    }

    pub fn work_rate(&self, task_name: &str) -> f64 {
        self.skills.get(task_name).map_or(0.0, |s| s.work_rate)
    }

    pub fn error_rate(&self, task_name: &str) -> f64 {
        self.skills.get(task_name).map_or(0.0, |s| s.error_rate)
    }

    pub fn error_detect_rate(&self, task_name: &str) -> f64 {
        self.skills.get(task_name).map_or(0.0, |s| s.error_detect_rate)
    }

    /// True when the resource can make progress on `task_name`.
    pub fn has_skill(&self, task_name: &str) -> bool {
        self.work_rate(task_name) > 0.0
    }

    /// Sum of work rates over every task name; the allocator prefers
    /// resources with a smaller sum.
    pub fn total_work_rate(&self) -> f64 {
        self.skills.values().map(|s| s.work_rate).sum()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Skill)> {
        self.skills.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<S: Into<String>> FromIterator<(S, Skill)> for SkillTable {
    fn from_iter<I: IntoIterator<Item = (S, Skill)>>(iter: I) -> Self {
        Self {
            skills: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
