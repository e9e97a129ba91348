//! Simulation entities.
//!
//! Entities are plain data stored in owning arenas and linked by index
//! handles. Behavior that spans several entities lives in
//! [`crate::systems`].

mod component;
mod ids;
mod organization;
mod project;
mod resource;
mod skill;
mod task;
mod team;
mod workflow;

pub use component::*;
pub use ids::*;
pub use organization::*;
pub use project::*;
pub use resource::*;
pub use skill::*;
pub use task::*;
pub use team::*;
pub use workflow::*;
