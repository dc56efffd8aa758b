//! Drivers around the core: where setups come from and how runs get scored.

use lab_core::kinematics::{degrees_to_radians, projectile_range};
use lab_core::{
    DropSetup, FreeFallObjective, LaunchSetup, LinearObjective, LinearSetup, Mission,
    MissionKind, PhysicsConfig, ProjectileObjective, Setup,
};
use rand::Rng;
use thiserror::Error;

mod run;
mod shared;

pub use run::{attempt_mission, MissionRun, ResultSink, RunError, RunStatus};
pub use shared::{catalog_order, OrderEntry, SequentialUnlock, SharedCatalog, UnlockPolicy};

pub trait AttemptSource {
    /// Setup to play against `mission`, or `None` to skip it.
    fn propose_setup(&mut self, mission: &Mission, physics: &PhysicsConfig) -> Option<Setup>;
}

/// Plays every judgeable mission with the closed-form answer:
/// 1. Linear: run at a plain speed for exactly as long as the distance
///    needs, or pick the speed that covers the distance in the target time.
/// 2. Free fall: pick the height or launch speed that yields the target.
/// 3. Projectile: 45° and the speed whose range is the target, raising the
///    launch point when the speed is capped.
pub struct AutoSolver;

/// Launch angle used for every projectile plan.
const LAUNCH_ANGLE_DEG: f64 = 45.0;
/// Fallbacks when a mission does not pin the run.
const DEFAULT_DISTANCE_M: f64 = 20.0;
const DEFAULT_DROP_HEIGHT_M: f64 = 50.0;
const PLAIN_SPEED_M_S: f64 = 5.0;
/// Margin that keeps "at most" and "at least" objectives on the right side.
const SAFETY_MARGIN: f64 = 0.001;

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn linear_setup(velocity: f64, distance: f64) -> Setup {
    Setup::LinearMotion(LinearSetup {
        initial_position: 0.0,
        velocity,
        target_distance: Some(distance),
        time_limit: None,
    })
}

fn timed_linear_setup(velocity: f64, time_limit: f64) -> Setup {
    Setup::LinearMotion(LinearSetup {
        initial_position: 0.0,
        velocity,
        target_distance: None,
        time_limit: Some(time_limit),
    })
}

fn fall_setup(initial_height: f64, initial_velocity: f64, gravity: Option<f64>) -> Setup {
    Setup::FreeFall(DropSetup {
        initial_height,
        initial_velocity,
        gravity,
    })
}

fn launch_setup(speed: f64, initial_height: f64) -> Setup {
    Setup::Projectile(LaunchSetup {
        speed,
        angle_deg: LAUNCH_ANGLE_DEG,
        initial_height,
        gravity: None,
    })
}

/// Speed and launch height that land a 45° shot at `range`, never faster
/// than `cap`.
fn plan_shot(range: f64, cap: Option<f64>, g: f64) -> (f64, f64) {
    let flat_speed = (range * g).sqrt();
    match cap {
        Some(cap) if cap < flat_speed && cap > 0.0 => {
            // Raise the launch point until the capped shot lands at `range`.
            let height = g * range * range / (cap * cap) - range;
            (cap, height)
        }
        _ => (flat_speed, 0.0),
    }
}

fn plan_linear(mission: &Mission, objective: LinearObjective) -> Option<Setup> {
    let target = mission.target_value();
    let distance = mission.limits().distance_m;
    match objective {
        LinearObjective::ReachDistance | LinearObjective::HighPrecision => {
            (target > 0.0).then(|| timed_linear_setup(PLAIN_SPEED_M_S, target / PLAIN_SPEED_M_S))
        }
        LinearObjective::ExactTime => {
            let d = distance.unwrap_or(PLAIN_SPEED_M_S * target);
            (target > 0.0).then(|| linear_setup(d / target, d))
        }
        LinearObjective::ExactSpeed => Some(linear_setup(target, distance.unwrap_or(DEFAULT_DISTANCE_M))),
        LinearObjective::RaceAgainstClock => {
            let d = distance.unwrap_or(DEFAULT_DISTANCE_M);
            (target > 0.0).then(|| linear_setup(d / (target * (1.0 - SAFETY_MARGIN)), d))
        }
    }
}

fn plan_free_fall(mission: &Mission, objective: FreeFallObjective, g: f64) -> Option<Setup> {
    let target = mission.target_value();
    let pinned_height = mission.limits().drop_height_m;
    match objective {
        FreeFallObjective::SimpleDrop => Some(fall_setup(target, 0.0, None)),
        FreeFallObjective::DifferentGravity => Some(fall_setup(
            pinned_height.unwrap_or(DEFAULT_DROP_HEIGHT_M),
            0.0,
            Some(target),
        )),
        FreeFallObjective::PredictTime => Some(fall_setup(
            pinned_height.unwrap_or(0.5 * g * target * target),
            0.0,
            None,
        )),
        FreeFallObjective::LaunchUpward => Some(fall_setup(0.0, (2.0 * g * target).sqrt(), None)),
        FreeFallObjective::EnergyConserved => None,
    }
}

fn plan_projectile(mission: &Mission, objective: ProjectileObjective, g: f64) -> Option<Setup> {
    let target = mission.target_value();
    let cap = mission.limits().max_launch_speed_m_s;
    match objective {
        ProjectileObjective::SimpleLaunch => {
            let (speed, height) = plan_shot(target * (1.0 + SAFETY_MARGIN), cap, g);
            Some(launch_setup(speed, height))
        }
        ProjectileObjective::FixedTarget | ProjectileObjective::LimitedShot => {
            let (speed, height) = plan_shot(target, cap, g);
            Some(launch_setup(speed, height))
        }
        ProjectileObjective::OptimalAngle | ProjectileObjective::MultipleTargets => None,
    }
}

// ---------------------------------------------------------------------------
// AutoSolver
// ---------------------------------------------------------------------------

impl AutoSolver {
    pub fn plan(mission: &Mission, physics: &PhysicsConfig) -> Option<Setup> {
        let g = physics.gravity;
        let setup = match mission.kind() {
            MissionKind::LinearMotion(objective) => plan_linear(mission, objective),
            MissionKind::FreeFall(objective) => plan_free_fall(mission, objective, g),
            MissionKind::Projectile(objective) => plan_projectile(mission, objective, g),
        }?;
        mission.apply_to(setup).ok()
    }
}

impl AttemptSource for AutoSolver {
    fn propose_setup(&mut self, mission: &Mission, physics: &PhysicsConfig) -> Option<Setup> {
        Self::plan(mission, physics)
    }
}

// ---------------------------------------------------------------------------
// NoisySolver
// ---------------------------------------------------------------------------

/// `AutoSolver` with a relative aim error drawn from `rng`, like a student
/// who knows the formula but misjudges the controls.
pub struct NoisySolver<R: Rng> {
    rng: R,
    /// Largest relative error, e.g. `0.05` for ±5%.
    jitter: f64,
}

/// Jitter outside `[0, 1]`, or not a number at all.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("jitter must be a finite fraction in [0, 1], got {0}")]
pub struct InvalidJitter(pub f64);

impl<R: Rng> NoisySolver<R> {
    pub fn new(rng: R, jitter: f64) -> Result<Self, InvalidJitter> {
        if !(0.0..=1.0).contains(&jitter) {
            return Err(InvalidJitter(jitter));
        }
        Ok(Self { rng, jitter })
    }

    fn factor(&mut self) -> f64 {
        if self.jitter > 0.0 {
            1.0 + self.rng.gen_range(-self.jitter..=self.jitter)
        } else {
            1.0
        }
    }
}

impl<R: Rng> AttemptSource for NoisySolver<R> {
    fn propose_setup(&mut self, mission: &Mission, physics: &PhysicsConfig) -> Option<Setup> {
        let mut setup = AutoSolver::plan(mission, physics)?;
        let factor = self.factor();
        match &mut setup {
            Setup::LinearMotion(linear) => linear.velocity *= factor,
            Setup::FreeFall(drop) => {
                if drop.initial_velocity > 0.0 {
                    drop.initial_velocity *= factor;
                } else if let Some(g) = drop.gravity.as_mut() {
                    *g *= factor;
                } else {
                    drop.initial_height *= factor;
                }
            }
            Setup::Projectile(launch) => launch.speed *= factor,
        }
        // Re-pin in case the error pushed past a mission limit.
        mission.apply_to(setup).ok()
    }
}

/// Where a 45° shot at `speed` from `height` lands, for display.
pub fn predicted_range(speed: f64, height: f64, physics: &PhysicsConfig) -> f64 {
    projectile_range(speed, degrees_to_radians(LAUNCH_ANGLE_DEG), height, physics.gravity)
}
