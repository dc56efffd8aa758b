//! `lab_core`: kinematics, simulation runs and mission scoring.
//!
//! No IO, no logging. Gravity is always passed in through `PhysicsConfig`.

mod catalog;
pub mod engine;
mod error;
pub mod kinematics;
mod mission;
mod progress;
pub mod scoring;
mod types;

pub use catalog::MissionCatalog;
pub use engine::{
    DropSetup, LaunchSetup, LinearSetup, MotionState, Sample, Setup, SimClock, Simulation,
    StepOutcome, StopReason,
};
pub use error::{CatalogError, SetupError};
pub use mission::{evaluation_rule, Comparison, Mission, Quantity};
pub use progress::{summarize, summarize_by_motion, ProgressSummary};
pub use types::*;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

#[cfg(test)]
mod tests;
