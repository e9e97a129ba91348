//! Arena handles.
//!
//! Every entity lives in an owning `Vec` (tasks and components inside their
//! workflow instance, teams and resources inside the organization). Peers
//! refer to each other through these indices instead of pointers.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub usize);

        impl $name {
            /// Position of the entity in its owning arena.
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Task within a single workflow instance.
    TaskId,
    "task#"
);
arena_id!(
    /// Component within a single workflow instance's component tree.
    ComponentId,
    "component#"
);
arena_id!(
    /// Worker or facility within the organization.
    ResourceId,
    "resource#"
);
arena_id!(
    /// Team within the organization.
    TeamId,
    "team#"
);

/// Task handle qualified by the workflow instance that owns it.
///
/// Resources are shared across instances, so what they record as "worked on"
/// must name the instance too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskRef {
    pub instance: usize,
    pub task: TaskId,
}

impl TaskRef {
    pub fn new(instance: usize, task: TaskId) -> Self {
        Self { instance, task }
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.task, self.instance)
    }
}
