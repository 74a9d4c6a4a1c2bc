mod orchestrator;
mod phase;
mod target;

pub use orchestrator::{Orchestrator, RunError};
pub use phase::{Phase, TargetState};
pub use target::{build_targets, Target};
