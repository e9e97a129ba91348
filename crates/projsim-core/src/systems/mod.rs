//! Systems - logic that runs across entities each tick

pub mod admission;
pub mod allocation;
pub mod pert;
pub mod progress;

pub use admission::Admission;
pub use allocation::{allocate, Allocation};
pub use pert::update_pert;
pub use progress::{check_finish, check_ready, check_start, perform, FinishOutcome};
