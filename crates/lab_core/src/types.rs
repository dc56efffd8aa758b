//! Type definitions for `lab_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the lab.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(MissionId);

// ---------------------------------------------------------------------------
// Motion types and mission sub-kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionKind {
    LinearMotion,
    FreeFall,
    Projectile,
}

impl MotionKind {
    pub const ALL: [MotionKind; 3] = [
        MotionKind::LinearMotion,
        MotionKind::FreeFall,
        MotionKind::Projectile,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MotionKind::LinearMotion => "Linear motion",
            MotionKind::FreeFall => "Free fall",
            MotionKind::Projectile => "Projectile",
        }
    }
}

impl std::fmt::Display for MotionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinearObjective {
    /// Stop as close as possible to a distance.
    ReachDistance,
    /// Finish the run in an exact time.
    ExactTime,
    /// Move at an exact speed.
    ExactSpeed,
    /// Like `ReachDistance` with a tight tolerance.
    HighPrecision,
    /// Finish in at most the target time.
    RaceAgainstClock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FreeFallObjective {
    SimpleDrop,
    /// Fall under a configured, non-default gravity.
    DifferentGravity,
    PredictTime,
    EnergyConserved,
    /// Launch upward and reach a peak height.
    LaunchUpward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileObjective {
    /// Land at least the target distance away.
    SimpleLaunch,
    FixedTarget,
    OptimalAngle,
    MultipleTargets,
    /// Hit a distance under a launch-speed cap.
    LimitedShot,
}

/// Motion type × sub-kind. Each tag has exactly one evaluation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "motion", content = "objective")]
pub enum MissionKind {
    LinearMotion(LinearObjective),
    FreeFall(FreeFallObjective),
    Projectile(ProjectileObjective),
}

impl MissionKind {
    pub fn motion(self) -> MotionKind {
        match self {
            MissionKind::LinearMotion(_) => MotionKind::LinearMotion,
            MissionKind::FreeFall(_) => MotionKind::FreeFall,
            MissionKind::Projectile(_) => MotionKind::Projectile,
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation output and physics parameters
// ---------------------------------------------------------------------------

/// Outcome of one simulation run. Produced once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub final_time: f64,
    pub final_position: f64,
    pub average_velocity: f64,
}

impl SimulationResult {
    pub fn new(final_time: f64, final_position: f64, average_velocity: f64) -> Self {
        Self {
            final_time,
            final_position,
            average_velocity,
        }
    }
}

/// Physical parameters of a run, passed explicitly to the simulation and to
/// mission evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// m/s², positive downward.
    pub gravity: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: crate::kinematics::DEFAULT_GRAVITY,
        }
    }
}

impl PhysicsConfig {
    pub fn with_gravity(gravity: f64) -> Self {
        Self { gravity }
    }

    pub fn reset_gravity(&mut self) {
        self.gravity = crate::kinematics::DEFAULT_GRAVITY;
    }
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    pub default_gravity: f64,
    /// Clock interval; one tick advances time by `tick_interval_ms / 1000` s.
    pub tick_interval_ms: u32,
    /// Runs that have not stopped by then finish as a timeout.
    pub max_run_seconds: f64,
    pub max_trajectory_samples: usize,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            default_gravity: crate::kinematics::DEFAULT_GRAVITY,
            tick_interval_ms: 30,
            max_run_seconds: 120.0,
            max_trajectory_samples: 500,
        }
    }
}

impl Constants {
    pub fn default_physics(&self) -> PhysicsConfig {
        PhysicsConfig::with_gravity(self.default_gravity)
    }
}

/// Scenario parameters a mission pins or caps. Unset fields leave the
/// player's choice alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioLimits {
    #[serde(default)]
    pub distance_m: Option<f64>,
    #[serde(default)]
    pub drop_height_m: Option<f64>,
    #[serde(default)]
    pub launch_speed_m_s: Option<f64>,
    #[serde(default)]
    pub max_launch_speed_m_s: Option<f64>,
}

/// Static mission definition as authored in content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionDef {
    pub id: MissionId,
    pub name: String,
    pub description: String,
    /// 1 (easy) to 5 (very hard).
    pub difficulty: u8,
    pub kind: MissionKind,
    pub target_value: f64,
    pub tolerance: f64,
    #[serde(default)]
    pub limits: ScenarioLimits,
}

#[derive(Debug, Clone)]
pub struct LabContent {
    pub content_version: String,
    pub constants: Constants,
    /// All definitions in catalog order.
    pub missions: Vec<MissionDef>,
}

// ---------------------------------------------------------------------------
// Progress types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionProgress {
    pub unlocked: bool,
    pub completed: bool,
    /// 0..=3, never decreases.
    pub stars_earned: u8,
    /// Never decreases.
    pub best_score: u32,
}

/// Outcome of registering one result against a mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub mission_id: MissionId,
    pub success: bool,
    /// Set only for successful attempts.
    pub precision: Option<f64>,
    pub stars: u8,
    pub points: u32,
    /// True if this attempt raised the stored stars or best score.
    pub new_best: bool,
}

/// Persistable progress of one mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: MissionId,
    pub unlocked: bool,
    pub completed: bool,
    pub stars_earned: u8,
    pub best_score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub content_version: String,
    pub missions: Vec<ProgressRecord>,
}
